//! Foundation module - Shared domain primitives.
//!
//! Contains the error vocabulary shared by every part of the port service.

mod errors;

pub use errors::{DomainError, ErrorCode, ValidationError};
