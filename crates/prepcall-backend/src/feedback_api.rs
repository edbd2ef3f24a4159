//! HTTP implementation of the feedback service.

use crate::config::BackendConfig;
use crate::http::{error_from_response, is_not_found};
use async_trait::async_trait;
use prepcall_core::feedback::{FeedbackCreated, FeedbackRecord, FeedbackRequest, FeedbackService};
use prepcall_core::session::Speaker;
use prepcall_core::{PrepcallError, Result};
use reqwest::Client;
use serde::Serialize;

/// Talks to the backend's feedback endpoints over HTTP.
#[derive(Clone)]
pub struct HttpFeedbackService {
    client: Client,
    config: BackendConfig,
}

impl HttpFeedbackService {
    /// Creates a service against the given backend.
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }
}

#[async_trait]
impl FeedbackService for HttpFeedbackService {
    async fn create_feedback(&self, request: &FeedbackRequest) -> Result<FeedbackCreated> {
        tracing::debug!(
            session_id = %request.session_id,
            entries = request.transcript.len(),
            "posting feedback-creation request"
        );
        let body = CreateFeedbackBody::from(request);
        let response = self
            .client
            .post(self.url("/api/v1/feedback"))
            .timeout(self.config.request_timeout)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let created: FeedbackCreated = response.json().await.map_err(|err| {
            PrepcallError::backend(format!("malformed feedback-creation response: {err}"))
        })?;
        Ok(created)
    }

    async fn get_feedback(&self, id: &str) -> Result<FeedbackRecord> {
        let response = self
            .client
            .get(self.url(&format!("/api/v1/feedback/{id}")))
            .timeout(self.config.request_timeout)
            .send()
            .await?;

        if is_not_found(response.status()) {
            return Err(PrepcallError::not_found("feedback", id));
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let record: FeedbackRecord = response.json().await.map_err(|err| {
            PrepcallError::backend(format!("malformed feedback response: {err}"))
        })?;
        Ok(record)
    }
}

/// Wire shape of the feedback-creation request.
#[derive(Debug, Serialize)]
struct CreateFeedbackBody {
    interview_id: String,
    candidate_id: String,
    transcript: Vec<TranscriptLine>,
}

/// One transcript line in the role/content shape the backend scores.
#[derive(Debug, Serialize)]
struct TranscriptLine {
    role: &'static str,
    content: String,
}

impl From<&FeedbackRequest> for CreateFeedbackBody {
    fn from(request: &FeedbackRequest) -> Self {
        Self {
            interview_id: request.session_id.clone(),
            candidate_id: request.candidate_id.clone(),
            transcript: request
                .transcript
                .iter()
                .map(|entry| TranscriptLine {
                    role: match entry.speaker {
                        Speaker::Ai => "assistant",
                        Speaker::Candidate => "user",
                    },
                    content: entry.text.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prepcall_core::session::TranscriptAggregator;

    #[test]
    fn test_wire_body_maps_speakers_to_roles() {
        let mut transcript = TranscriptAggregator::new();
        transcript.append(Speaker::Ai, "Tell me about yourself");
        transcript.append(Speaker::Candidate, "Sure.");

        let request = FeedbackRequest {
            session_id: "itv-1".to_string(),
            candidate_id: "cand-1".to_string(),
            transcript: transcript.entries().to_vec(),
        };

        let body = CreateFeedbackBody::from(&request);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["interview_id"], "itv-1");
        assert_eq!(json["transcript"][0]["role"], "assistant");
        assert_eq!(json["transcript"][1]["role"], "user");
        assert_eq!(json["transcript"][1]["content"], "Sure.");
    }
}
