//! In-Memory Port Repository Adapter
//!
//! Implements [`PortRepository`] on top of the generic [`InMemoryStore`].

use async_trait::async_trait;

use super::in_memory_store::InMemoryStore;
use crate::domain::foundation::DomainError;
use crate::domain::port::Port;
use crate::ports::PortRepository;

/// Port repository backed by process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPortRepository {
    store: InMemoryStore<Port>,
}

impl InMemoryPortRepository {
    /// Create a repository with its own empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository over an existing store, e.g. one shared with the
    /// shutdown sequence.
    pub fn with_store(store: InMemoryStore<Port>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PortRepository for InMemoryPortRepository {
    async fn save(&self, port: &Port) -> Result<(), DomainError> {
        self.store.put(port.id(), port.clone()).await;
        Ok(())
    }

    async fn update(&self, port: &Port) -> Result<bool, DomainError> {
        Ok(self.store.replace(port.id(), port.clone()).await.is_some())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Port>, DomainError> {
        Ok(self.store.get(id).await)
    }

    async fn find_all(&self) -> Result<Vec<Port>, DomainError> {
        Ok(self.store.get_all().await)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.store.len().await)
    }

    async fn delete(&self, id: &str) -> Result<Option<Port>, DomainError> {
        Ok(self.store.delete(id).await)
    }
}
