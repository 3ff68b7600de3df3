//! Storage Adapters
//!
//! In-memory storage for port records.
//!
//! ## Available Adapters
//!
//! - **InMemoryStore** - Generic keyed container behind a reader-writer lock
//! - **InMemoryPortRepository** - `PortRepository` over an `InMemoryStore<Port>`
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{InMemoryPortRepository, InMemoryStore};
//!
//! let store = InMemoryStore::new();
//! let repository = InMemoryPortRepository::with_store(store.clone());
//! ```

mod in_memory_port_repository;
mod in_memory_store;

pub use in_memory_port_repository::InMemoryPortRepository;
pub use in_memory_store::{InMemoryStore, StoreError};
