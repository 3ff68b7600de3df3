//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PortRepository` - Storage of port records

mod port_repository;

pub use port_repository::PortRepository;
