//! DeletePortHandler - Command handler for removing a port.

use std::sync::Arc;

use crate::domain::port::{Port, PortError};
use crate::ports::PortRepository;

/// Command to delete a port.
#[derive(Debug, Clone)]
pub struct DeletePortCommand {
    pub port_id: String,
}

/// Handler for deleting ports.
pub struct DeletePortHandler {
    repository: Arc<dyn PortRepository>,
}

impl DeletePortHandler {
    pub fn new(repository: Arc<dyn PortRepository>) -> Self {
        Self { repository }
    }

    /// Removes the port and returns it.
    pub async fn handle(&self, cmd: DeletePortCommand) -> Result<Port, PortError> {
        let deleted = self
            .repository
            .delete(&cmd.port_id)
            .await?
            .ok_or_else(|| PortError::not_found(cmd.port_id.clone()))?;

        tracing::info!(port_id = %cmd.port_id, "Port deleted");
        Ok(deleted)
    }
}
