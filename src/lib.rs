//! Port Service - In-memory port registry
//!
//! This crate stores harbor records in a concurrent in-memory store and
//! ingests arbitrarily large JSON uploads through a streaming, cancellable
//! pipeline.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod shutdown;
pub mod telemetry;
