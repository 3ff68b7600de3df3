//! Port module - the harbor record and its errors.

mod aggregate;
mod errors;

pub use aggregate::{Port, PortAttributes, FIELD_CITY, FIELD_COUNTRY, FIELD_ID, FIELD_NAME};
pub use errors::PortError;
