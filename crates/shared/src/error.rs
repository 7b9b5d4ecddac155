use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error reply carried on the control channel: a non-zero `status` plus a
/// human readable `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("remote error {status}: {message}")]
pub struct RemoteError {
    pub status: i64,
    pub message: String,
}

impl RemoteError {
    pub fn new(status: i64, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}
