use std::path::PathBuf;

use thiserror::Error;

use crate::harness::HarnessReport;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid proxy: {0}")]
    InvalidProxy(String),

    #[error("Failed to read attachment {}: {source}", .path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl HarnessError {
    /// Stable code reported alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            HarnessError::RequestFailed(e) => {
                if e.is_timeout() {
                    "TIMEOUT"
                } else if e.is_connect() {
                    "CONNECTION_FAILED"
                } else if e.is_request() || e.is_builder() {
                    "REQUEST_ERROR"
                } else {
                    "REQUEST_FAILED"
                }
            }
            HarnessError::InvalidUrl(_) => "INVALID_URL",
            HarnessError::InvalidProxy(_) => "INVALID_PROXY",
            HarnessError::Attachment { .. } => "ATTACHMENT_ERROR",
            HarnessError::Payload(_) => "PAYLOAD_ERROR",
            HarnessError::InvalidResponse(_) => "INVALID_RESPONSE",
        }
    }
}

impl From<HarnessError> for HarnessReport {
    fn from(err: HarnessError) -> Self {
        // reqwest hides the io cause behind its own Display
        let message = match &err {
            HarnessError::RequestFailed(e) => match std::error::Error::source(e) {
                Some(cause) => format!("{}: {}", err, cause),
                None => err.to_string(),
            },
            _ => err.to_string(),
        };
        HarnessReport::error(message, err.code().to_string())
    }
}
