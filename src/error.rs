/// Error types shared by the cloud client, the payload decoders and the poller
use thiserror::Error;

/// Failure while turning a raw status string into a reading
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// Not a valid hex block behind the `10#` prefix
    #[error("unexpected payload format: {0}")]
    Format(String),

    /// An anchor byte is missing or carries the wrong marker for this model
    #[error("expected tag 0x{expected:02X} at byte {offset}, found {}", found_label(.found))]
    TagMismatch {
        offset: usize,
        expected: u8,
        found: Option<u8>,
    },
}

fn found_label(found: &Option<u8>) -> String {
    match found {
        Some(b) => format!("0x{:02X}", b),
        None => "end of payload".to_string(),
    }
}

/// Failure talking to the vendor cloud
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloudError {
    /// Login rejected or its response was malformed
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Non-200 HTTP status, non-zero `code`, or an unreadable response
    #[error("{operation} failed: {detail}")]
    Api {
        operation: &'static str,
        status: Option<u16>,
        detail: String,
    },
}

impl CloudError {
    pub fn api(operation: &'static str, status: Option<u16>, detail: impl Into<String>) -> Self {
        CloudError::Api {
            operation,
            status,
            detail: detail.into(),
        }
    }
}

/// The only cycle-fatal outcome of a poll
#[derive(Debug, Error)]
pub enum PollError {
    #[error("update failed: {0}")]
    UpdateFailed(#[from] CloudError),
}

/// Failure below the HTTP layer (connection, TLS, body read)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);
