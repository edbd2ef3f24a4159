//! HTTP implementation of the interview lookup service.

use crate::config::BackendConfig;
use crate::http::{error_from_response, is_not_found};
use async_trait::async_trait;
use prepcall_core::interview::{InterviewDetails, InterviewService};
use prepcall_core::{PrepcallError, Result};
use reqwest::Client;

/// Talks to the backend's interview endpoints over HTTP.
#[derive(Clone)]
pub struct HttpInterviewService {
    client: Client,
    config: BackendConfig,
}

impl HttpInterviewService {
    /// Creates a service against the given backend.
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn fetch(&self, url: String, entity_id: &str) -> Result<InterviewDetails> {
        let response = self
            .client
            .get(url)
            .timeout(self.config.request_timeout)
            .send()
            .await?;

        if is_not_found(response.status()) {
            return Err(PrepcallError::not_found("interview", entity_id));
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let details: InterviewDetails = response.json().await.map_err(|err| {
            PrepcallError::backend(format!("malformed interview response: {err}"))
        })?;
        Ok(details)
    }
}

#[async_trait]
impl InterviewService for HttpInterviewService {
    async fn find_by_id(&self, id: &str) -> Result<InterviewDetails> {
        let url = format!("{}/api/v1/interviews/{id}", self.config.base_url);
        self.fetch(url, id).await
    }

    async fn find_by_access_code(&self, code: &str) -> Result<InterviewDetails> {
        let url = format!("{}/api/v1/interviews/code/{code}", self.config.base_url);
        self.fetch(url, code).await
    }
}
