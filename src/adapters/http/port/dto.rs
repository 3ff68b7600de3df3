//! HTTP DTOs for port endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::domain::port::{Port, PortError};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to rename a port.
#[derive(Debug, Clone, Deserialize)]
pub struct RenamePortRequest {
    pub name: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Full port view for API responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortResponse {
    pub id: String,
    pub name: String,
    pub code: String,
    pub city: String,
    pub country: String,
    pub alias: Vec<String>,
    pub regions: Vec<String>,
    pub coordinates: Vec<f64>,
    pub province: String,
    pub timezone: String,
    pub unlocs: Vec<String>,
}

impl From<Port> for PortResponse {
    fn from(port: Port) -> Self {
        Self {
            id: port.id().to_string(),
            name: port.name().to_string(),
            code: port.code().to_string(),
            city: port.city().to_string(),
            country: port.country().to_string(),
            alias: port.alias().to_vec(),
            regions: port.regions().to_vec(),
            coordinates: port.coordinates().to_vec(),
            province: port.province().to_string(),
            timezone: port.timezone().to_string(),
            unlocs: port.unlocs().to_vec(),
        }
    }
}

/// List of ports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortListResponse {
    pub items: Vec<PortResponse>,
    pub total: usize,
}

impl From<Vec<Port>> for PortListResponse {
    fn from(ports: Vec<Port>) -> Self {
        let items: Vec<PortResponse> = ports.into_iter().map(Into::into).collect();
        Self {
            total: items.len(),
            items,
        }
    }
}

/// Result of a completed upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub committed: usize,
}

/// Number of stored ports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: usize,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&PortError> for ErrorResponse {
    fn from(error: &PortError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.message(),
            details: None,
        }
    }
}
