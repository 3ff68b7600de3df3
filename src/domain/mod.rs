//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (errors, error codes)
//! - `port` - The port (harbor) record and its error type

pub mod foundation;
pub mod port;
