//! GetPortHandler - Query handler for retrieving a single port.

use std::sync::Arc;

use crate::domain::port::{Port, PortError};
use crate::ports::PortRepository;

/// Query to get a port by ID.
#[derive(Debug, Clone)]
pub struct GetPortQuery {
    pub port_id: String,
}

/// Handler for retrieving a port.
pub struct GetPortHandler {
    repository: Arc<dyn PortRepository>,
}

impl GetPortHandler {
    pub fn new(repository: Arc<dyn PortRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: GetPortQuery) -> Result<Port, PortError> {
        self.repository
            .find_by_id(&query.port_id)
            .await?
            .ok_or_else(|| PortError::not_found(query.port_id))
    }
}
