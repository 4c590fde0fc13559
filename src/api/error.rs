//! Submission error taxonomy.
//!
//! Only submission-level failures are user-visible; streaming-level
//! anomalies (malformed frames, duplicates, dropped channels) degrade
//! silently and never surface here.

use thiserror::Error;

/// Errors from the one-shot job submission call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The request never reached the backend.
    #[error("Network Error: {0}")]
    Unreachable(String),

    /// The backend responded with a non-success status.
    #[error("Server Error: {detail}")]
    Rejected { status: u16, detail: String },

    /// A required request field was empty. Caught before any network
    /// traffic happens.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
}

impl SubmitError {
    /// Build an `Unreachable` error from a transport failure.
    pub fn unreachable(err: &reqwest::Error) -> Self {
        if err.is_connect() {
            SubmitError::Unreachable(
                "Unable to connect to the server. Please check if the backend is running."
                    .to_string(),
            )
        } else {
            SubmitError::Unreachable(err.to_string())
        }
    }

    /// Build a `Rejected` error, falling back to the canonical status
    /// text when the backend sent no usable `detail`.
    pub fn rejected(status: reqwest::StatusCode, detail: Option<String>) -> Self {
        let detail = detail
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        SubmitError::Rejected {
            status: status.as_u16(),
            detail,
        }
    }

    /// True when the failure happened before any response arrived.
    pub fn is_network(&self) -> bool {
        matches!(self, SubmitError::Unreachable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_uses_detail() {
        let err = SubmitError::rejected(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            Some("automation crashed at login".to_string()),
        );
        assert_eq!(err.to_string(), "Server Error: automation crashed at login");
    }

    #[test]
    fn test_rejected_falls_back_to_status_text() {
        let err = SubmitError::rejected(reqwest::StatusCode::BAD_GATEWAY, None);
        assert_eq!(err.to_string(), "Server Error: Bad Gateway");

        let err = SubmitError::rejected(
            reqwest::StatusCode::SERVICE_UNAVAILABLE,
            Some("   ".to_string()),
        );
        assert_eq!(err.to_string(), "Server Error: Service Unavailable");
    }

    #[test]
    fn test_is_network() {
        assert!(SubmitError::Unreachable("down".to_string()).is_network());
        assert!(!SubmitError::rejected(reqwest::StatusCode::BAD_GATEWAY, None).is_network());
        assert!(!SubmitError::MissingField("recipient").is_network());
    }
}
