//! Port repository port.
//!
//! Defines the contract for storing and retrieving Port aggregates.
//!
//! # Design
//!
//! - **Upsert writes**: `save` overwrites any port stored under the same id
//! - **Copies out**: every read returns owned values, never live references
//! - **Per-record**: no cross-record transactions

use crate::domain::foundation::DomainError;
use crate::domain::port::Port;
use async_trait::async_trait;

/// Repository port for Port aggregate storage.
#[async_trait]
pub trait PortRepository: Send + Sync {
    /// Insert or replace a port, keyed by its id.
    ///
    /// # Errors
    ///
    /// - `StoreUnavailable` if the backing store can no longer accept writes
    async fn save(&self, port: &Port) -> Result<(), DomainError>;

    /// Replace a port that is already stored under its id.
    ///
    /// Returns `false`, and stores nothing, if no port has that id. The
    /// presence check and the write are atomic with respect to `delete`.
    async fn update(&self, port: &Port) -> Result<bool, DomainError>;

    /// Find a port by its id.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &str) -> Result<Option<Port>, DomainError>;

    /// Snapshot of every stored port, in no particular order.
    async fn find_all(&self) -> Result<Vec<Port>, DomainError>;

    /// Number of stored ports.
    async fn count(&self) -> Result<usize, DomainError>;

    /// Remove a port, returning it if it was present.
    async fn delete(&self, id: &str) -> Result<Option<Port>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn port_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn PortRepository) {}
    }
}
