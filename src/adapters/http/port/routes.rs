//! HTTP routes for port endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    count_ports, delete_port, get_port, list_ports, rename_port, upload_ports, PortHandlers,
};

/// Creates the port router with all endpoints.
pub fn port_routes(handlers: PortHandlers) -> Router {
    Router::new()
        .route("/", post(upload_ports).get(list_ports))
        .route("/count", get(count_ports))
        .route("/:id", get(get_port).put(rename_port).delete(delete_port))
        .with_state(handlers)
}
