//! Upload configuration

use serde::Deserialize;

use super::error::ValidationError;

const MAX_BODY_LIMIT: u64 = 1024 * 1024 * 1024;

/// Limits applied to bulk uploads
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Maximum number of body bytes read from one upload
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,
}

impl UploadConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_body_bytes == 0 || self.max_body_bytes > MAX_BODY_LIMIT {
            return Err(ValidationError::InvalidBodyLimit);
        }
        Ok(())
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_max_body_bytes() -> u64 {
    50 * 1024 * 1024
}
