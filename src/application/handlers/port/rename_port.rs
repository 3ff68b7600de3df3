//! RenamePortHandler - Command handler for renaming a port.

use std::sync::Arc;

use crate::domain::port::{Port, PortError};
use crate::ports::PortRepository;

/// Command to rename a port.
#[derive(Debug, Clone)]
pub struct RenamePortCommand {
    pub port_id: String,
    pub new_name: String,
}

/// Handler for renaming ports.
pub struct RenamePortHandler {
    repository: Arc<dyn PortRepository>,
}

impl RenamePortHandler {
    pub fn new(repository: Arc<dyn PortRepository>) -> Self {
        Self { repository }
    }

    /// Stores a renamed copy of the port and returns it.
    ///
    /// The stored port is replaced whole, never mutated in place. A port
    /// deleted after it was loaded stays deleted and the rename reports
    /// `NotFound`. Concurrent renames of one port resolve last-writer-wins.
    pub async fn handle(&self, cmd: RenamePortCommand) -> Result<Port, PortError> {
        // 1. Load port
        let port = self
            .repository
            .find_by_id(&cmd.port_id)
            .await?
            .ok_or_else(|| PortError::not_found(cmd.port_id.clone()))?;

        // 2. Copy with the new name
        let renamed = port.with_name(cmd.new_name)?;

        // 3. Persist, unless the port was deleted in the meantime
        if !self.repository.update(&renamed).await? {
            return Err(PortError::not_found(cmd.port_id));
        }

        tracing::info!(port_id = %cmd.port_id, name = %renamed.name(), "Port renamed");
        Ok(renamed)
    }
}
