//! Errors from talking to the workflow endpoint

use thiserror::Error;

/// Why a save (or a fetch of the stored workflow) did not succeed
#[derive(Debug, Error)]
pub enum SaveError {
    /// The server answered `{"success": false}`
    #[error("{url}: server rejected the workflow (HTTP {status}) - {}", .message.as_deref().unwrap_or("no reason given"))]
    Rejected {
        url: String,
        status: u16,
        message: Option<String>,
    },
    /// The request never produced a response
    #[error("{url}: request failed - {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// A response arrived but could not be interpreted
    #[error("{url}: unexpected response - {message}")]
    InvalidResponse { url: String, message: String },
}

impl SaveError {
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        SaveError::Transport {
            url: url.into(),
            source,
        }
    }

    pub fn invalid_response(url: impl Into<String>, message: impl Into<String>) -> Self {
        SaveError::InvalidResponse {
            url: url.into(),
            message: message.into(),
        }
    }

    /// The server reported the failure itself
    pub fn is_rejected(&self) -> bool {
        matches!(self, SaveError::Rejected { .. })
    }

    /// Transport or parse failure
    pub fn is_transport(&self) -> bool {
        !self.is_rejected()
    }

    /// Short message for the notification bar
    pub fn notification_text(&self) -> &'static str {
        if self.is_rejected() {
            "Failed to save workflow."
        } else {
            "Save failed."
        }
    }
}
