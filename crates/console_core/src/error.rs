use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("invalid control channel url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to encode control frame: {0}")]
    Encode(#[from] serde_json::Error),
}
