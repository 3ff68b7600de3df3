//! HTTP adapter for port endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CountResponse, ErrorResponse, PortListResponse, PortResponse, RenamePortRequest,
    UploadResponse,
};
pub use handlers::PortHandlers;
pub use routes::port_routes;
