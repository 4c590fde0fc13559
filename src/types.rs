//! Wire types shared with the automation backend.
//!
//! All field names follow the backend's camelCase JSON convention.

use serde::{Deserialize, Serialize};

use crate::api::SubmitError;

/// A job submission: credentials, recipient, and what to do.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub account_id: String,
    pub credential: String,
    pub recipient: String,
    pub task_descriptor: String,
}

impl JobRequest {
    /// Required-field presence check. Everything beyond presence is the
    /// backend's responsibility.
    pub fn validate(&self) -> Result<(), SubmitError> {
        for (name, value) in [
            ("accountId", &self.account_id),
            ("credential", &self.credential),
            ("recipient", &self.recipient),
            ("taskDescriptor", &self.task_descriptor),
        ] {
            if value.trim().is_empty() {
                return Err(SubmitError::MissingField(name));
            }
        }
        Ok(())
    }
}

/// Terminal outcome reported by the one-shot submission call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// The backend simulated the run (no real side effect).
    Demo,
    /// The real automation ran and the side effect was performed.
    Success,
    /// The backend reported a failure during the run.
    Error,
}

/// Response body of `POST /submit-job`.
///
/// `session_id` correlates the job with its live progress channel.
/// `snapshot` is present when the backend ran synchronously and there is
/// nothing left to stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    pub status: JobStatus,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub snapshot: Option<Vec<StepEvent>>,
    /// Opaque content generated by the backend (e.g. drafted message
    /// text). Carried through for display, never interpreted.
    #[serde(default)]
    pub generated_content: Option<serde_json::Value>,
}

/// One reported milestone of the remote automation.
///
/// `filename` names the screenshot artifact captured for the step and is
/// the unique key for deduplication. `image_ref` resolves to the artifact
/// under the backend's `/screenshots/` namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEvent {
    pub filename: String,
    pub step: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub image_ref: String,
}
