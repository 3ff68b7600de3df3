//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `storage` - In-memory port storage
//! - `http` - REST API over axum

pub mod http;
pub mod storage;

pub use self::http::{router, PortHandlers};
pub use storage::{InMemoryPortRepository, InMemoryStore, StoreError};
