//! Error types for shot-curator
//!
//! Transport failures are normalised into [`GatewayError`] by the gateway.
//! The domain errors below are what the update loop sees; each one maps
//! to a notice for the operator and never leaves the handler that caught it.

use thiserror::Error;

use crate::state::data::ClusterId;

/// Failure talking to the classification service
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    /// Connection refused, reset, DNS failure...
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx status, or a 2xx body reporting `success: false`
    #[error("Service error {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            GatewayError::Service {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        GatewayError::Io(err.to_string())
    }
}

/// Either collection fetch of a load failed
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Failed to load clusters: {0}")]
pub struct LoadError(#[from] pub GatewayError);

/// A reclassification command did not go through
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MoveError {
    #[error("Cluster {0} is not part of the current view")]
    UnknownCluster(ClusterId),

    #[error("Failed to move shot: {0}")]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("Upload failed: {0}")]
pub struct UploadError(#[from] pub GatewayError);

/// Best-effort telemetry failure, logged and otherwise ignored
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Feedback not recorded: {0}")]
pub struct FeedbackError(#[from] pub GatewayError);

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ThumbnailError {
    #[error("Keyframe unavailable: {0}")]
    Fetch(#[from] GatewayError),

    #[error("Keyframe could not be decoded: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_cause() {
        let err = LoadError(GatewayError::Service {
            status: 500,
            body: "boom".to_string(),
        });
        assert_eq!(err.to_string(), "Failed to load clusters: Service error 500: boom");

        let err = MoveError::UnknownCluster("character_4".to_string());
        assert_eq!(err.to_string(), "Cluster character_4 is not part of the current view");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.mp4");
        let err: UploadError = GatewayError::from(io).into();
        assert!(matches!(err.0, GatewayError::Io(ref msg) if msg.contains("missing.mp4")));
    }
}
