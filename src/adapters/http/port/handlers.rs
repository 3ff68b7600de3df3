//! HTTP handlers for port endpoints.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::watch;

use crate::application::handlers::port::{
    CountPortsHandler, CountPortsQuery, DeletePortCommand, DeletePortHandler, GetPortHandler,
    GetPortQuery, ListPortsHandler, ListPortsQuery, RenamePortCommand, RenamePortHandler,
    UploadError, UploadPortsHandler,
};
use crate::domain::port::PortError;
use crate::ports::PortRepository;

use super::dto::{
    CountResponse, ErrorResponse, PortListResponse, PortResponse, RenamePortRequest,
    UploadResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct PortHandlers {
    upload_handler: Arc<UploadPortsHandler>,
    get_handler: Arc<GetPortHandler>,
    list_handler: Arc<ListPortsHandler>,
    count_handler: Arc<CountPortsHandler>,
    rename_handler: Arc<RenamePortHandler>,
    delete_handler: Arc<DeletePortHandler>,
    shutdown: watch::Receiver<bool>,
}

impl PortHandlers {
    /// Builds every port handler over one repository.
    ///
    /// Uploads in flight are cancelled once `shutdown` flips to `true`.
    pub fn new(
        repository: Arc<dyn PortRepository>,
        max_upload_bytes: u64,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            upload_handler: Arc::new(
                UploadPortsHandler::new(repository.clone()).with_max_bytes(max_upload_bytes),
            ),
            get_handler: Arc::new(GetPortHandler::new(repository.clone())),
            list_handler: Arc::new(ListPortsHandler::new(repository.clone())),
            count_handler: Arc::new(CountPortsHandler::new(repository.clone())),
            rename_handler: Arc::new(RenamePortHandler::new(repository.clone())),
            delete_handler: Arc::new(DeletePortHandler::new(repository)),
            shutdown,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/ports - Stream a bulk upload into the store
pub async fn upload_ports(
    State(handlers): State<PortHandlers>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let limit = handlers.upload_handler.max_bytes();
    if let Some(length) = content_length(&headers) {
        if length > limit {
            tracing::warn!(content_length = length, limit, "Upload rejected before reading");
            return handle_port_error(PortError::payload_too_large(limit));
        }
    }

    match handlers
        .upload_handler
        .handle(body.into_data_stream(), handlers.shutdown.clone())
        .await
    {
        Ok(summary) => (
            StatusCode::OK,
            Json(UploadResponse {
                committed: summary.committed,
            }),
        )
            .into_response(),
        Err(e) => handle_upload_error(e),
    }
}

/// GET /api/ports - List all ports
pub async fn list_ports(State(handlers): State<PortHandlers>) -> Response {
    match handlers.list_handler.handle(ListPortsQuery).await {
        Ok(ports) => {
            let response: PortListResponse = ports.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_port_error(e),
    }
}

/// GET /api/ports/count - Number of stored ports
pub async fn count_ports(State(handlers): State<PortHandlers>) -> Response {
    match handlers.count_handler.handle(CountPortsQuery).await {
        Ok(count) => (StatusCode::OK, Json(CountResponse { count })).into_response(),
        Err(e) => handle_port_error(e),
    }
}

/// GET /api/ports/:id - Get one port
pub async fn get_port(
    State(handlers): State<PortHandlers>,
    Path(port_id): Path<String>,
) -> Response {
    match handlers.get_handler.handle(GetPortQuery { port_id }).await {
        Ok(port) => {
            let response: PortResponse = port.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_port_error(e),
    }
}

/// PUT /api/ports/:id - Rename a port
pub async fn rename_port(
    State(handlers): State<PortHandlers>,
    Path(port_id): Path<String>,
    Json(req): Json<RenamePortRequest>,
) -> Response {
    let cmd = RenamePortCommand {
        port_id,
        new_name: req.name,
    };

    match handlers.rename_handler.handle(cmd).await {
        Ok(port) => {
            let response: PortResponse = port.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_port_error(e),
    }
}

/// DELETE /api/ports/:id - Delete a port
pub async fn delete_port(
    State(handlers): State<PortHandlers>,
    Path(port_id): Path<String>,
) -> Response {
    match handlers.delete_handler.handle(DeletePortCommand { port_id }).await {
        Ok(port) => {
            let response: PortResponse = port.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_port_error(e),
    }
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn status_for(error: &PortError) -> StatusCode {
    match error {
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::ValidationFailed { .. } | PortError::MalformedInput(_) => {
            StatusCode::BAD_REQUEST
        }
        PortError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        PortError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        PortError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn handle_port_error(error: PortError) -> Response {
    if let PortError::Infrastructure(msg) = &error {
        tracing::error!(error = %msg, "Port request failed");
    }
    (status_for(&error), Json(ErrorResponse::from(&error))).into_response()
}

fn handle_upload_error(UploadError { committed, error }: UploadError) -> Response {
    let body = ErrorResponse::from(&error).with_details(serde_json::json!({
        "committed": committed,
    }));
    (status_for(&error), Json(body)).into_response()
}
