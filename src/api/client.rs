//! Backend HTTP client: job submission and screenshot fetches.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::api::SubmitError;
use crate::types::{JobRequest, JobResult};

/// Error body shape the backend uses for non-2xx responses.
#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Client for the automation backend's HTTP surface.
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    /// Create a client for the given base URL (scheme + host + port).
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("courier/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a job and wait for its one-shot result.
    ///
    /// No client-side timeout is imposed; the run can legitimately take
    /// minutes and the transport default applies. Not retried.
    pub async fn submit(&self, request: &JobRequest) -> Result<JobResult, SubmitError> {
        request.validate()?;

        let url = format!("{}/submit-job", self.base_url);
        debug!(url = %url, "submitting job");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|err| SubmitError::unreachable(&err))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail);
            return Err(SubmitError::rejected(status, detail));
        }

        response
            .json::<JobResult>()
            .await
            .map_err(|err| SubmitError::Rejected {
                status: status.as_u16(),
                detail: format!("unreadable response body: {err}"),
            })
    }

    /// Fetch a step's screenshot artifact.
    ///
    /// Best-effort by contract: any failure is logged and reported as
    /// `None`, never an error. A missing image must not break the view.
    pub async fn fetch_screenshot(&self, image_ref: &str) -> Option<Vec<u8>> {
        let url = if image_ref.starts_with('/') {
            format!("{}{}", self.base_url, image_ref)
        } else {
            format!("{}/screenshots/{}", self.base_url, image_ref)
        };

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(url = %url, error = %err, "screenshot fetch failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(url = %url, status = %response.status(), "screenshot not available");
            return None;
        }

        match response.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(err) => {
                warn!(url = %url, error = %err, "screenshot body read failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = BackendClient::new("http://127.0.0.1:8000/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_field_before_network() {
        // Points at a closed port; the presence check must fire first.
        let client = BackendClient::new("http://127.0.0.1:9").unwrap();
        let request = JobRequest {
            account_id: String::new(),
            credential: "x".to_string(),
            recipient: "y".to_string(),
            task_descriptor: "z".to_string(),
        };
        match client.submit(&request).await {
            Err(SubmitError::MissingField(name)) => assert_eq!(name, "accountId"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }
}
