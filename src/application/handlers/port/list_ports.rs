//! ListPortsHandler - Query handler returning a snapshot of every port.

use std::sync::Arc;

use crate::domain::port::{Port, PortError};
use crate::ports::PortRepository;

/// Query for all stored ports.
#[derive(Debug, Clone, Default)]
pub struct ListPortsQuery;

/// Handler for listing ports.
pub struct ListPortsHandler {
    repository: Arc<dyn PortRepository>,
}

impl ListPortsHandler {
    pub fn new(repository: Arc<dyn PortRepository>) -> Self {
        Self { repository }
    }

    /// Returns the ports sorted by ID so repeated calls are stable.
    pub async fn handle(&self, _query: ListPortsQuery) -> Result<Vec<Port>, PortError> {
        let mut ports = self.repository.find_all().await?;
        ports.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(ports)
    }
}
