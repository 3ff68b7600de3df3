//! CountPortsHandler - Query handler for the number of stored ports.

use std::sync::Arc;

use crate::domain::port::PortError;
use crate::ports::PortRepository;

/// Query for the port count.
#[derive(Debug, Clone, Default)]
pub struct CountPortsQuery;

/// Handler for counting ports.
pub struct CountPortsHandler {
    repository: Arc<dyn PortRepository>,
}

impl CountPortsHandler {
    pub fn new(repository: Arc<dyn PortRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, _query: CountPortsQuery) -> Result<usize, PortError> {
        Ok(self.repository.count().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryPortRepository;
    use crate::domain::port::{Port, PortAttributes};

    #[tokio::test]
    async fn counts_stored_ports() {
        let repo = Arc::new(InMemoryPortRepository::new());
        let handler = CountPortsHandler::new(repo.clone());
        assert_eq!(handler.handle(CountPortsQuery).await.unwrap(), 0);

        for id in ["A", "B"] {
            let port = Port::new(
                id,
                PortAttributes {
                    name: "n".to_string(),
                    city: "c".to_string(),
                    country: "k".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
            repo.save(&port).await.unwrap();
        }

        assert_eq!(handler.handle(CountPortsQuery).await.unwrap(), 2);
    }
}
