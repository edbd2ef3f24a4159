//! Feedback dispatch.
//!
//! Consumes a finished session's transcript and calls the remote
//! feedback-creation operation. The remote endpoint is not proven
//! idempotent, so a failed dispatch is never retried automatically; the
//! caller is routed home and may start a fresh session instead.

use crate::outcome::SessionOutcome;
use prepcall_core::feedback::{FeedbackRequest, FeedbackService};
use std::sync::Arc;

/// Sends at most one feedback-creation request per invocation and converts
/// the result into a navigation decision.
#[derive(Clone)]
pub struct FeedbackDispatcher {
    service: Arc<dyn FeedbackService>,
}

impl FeedbackDispatcher {
    /// Creates a dispatcher over the given feedback service.
    pub fn new(service: Arc<dyn FeedbackService>) -> Self {
        Self { service }
    }

    /// Sends the feedback-creation request and decides where to route.
    ///
    /// Success with an identifier routes to the feedback-detail view.
    /// Anything else (transport failure, non-success status, the remote
    /// explicitly reporting failure, or a response without an identifier)
    /// is logged and routes to the neutral landing point.
    pub async fn dispatch(&self, request: FeedbackRequest) -> SessionOutcome {
        let session_id = request.session_id.clone();
        match self.service.create_feedback(&request).await {
            Ok(created) if created.success => match created.id {
                Some(feedback_id) => {
                    tracing::info!(%session_id, %feedback_id, "feedback created");
                    SessionOutcome::FeedbackReady { feedback_id }
                }
                None => {
                    tracing::warn!(%session_id, "feedback response missing identifier");
                    SessionOutcome::ReturnHome
                }
            },
            Ok(_) => {
                tracing::warn!(%session_id, "backend reported feedback-creation failure");
                SessionOutcome::ReturnHome
            }
            Err(err) => {
                tracing::warn!(%session_id, error = %err, "feedback dispatch failed");
                SessionOutcome::ReturnHome
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use prepcall_core::feedback::{FeedbackCreated, FeedbackRecord};
    use prepcall_core::session::{Speaker, TranscriptAggregator};
    use prepcall_core::{PrepcallError, Result};
    use std::sync::Mutex;

    struct MockFeedbackService {
        response: Result<FeedbackCreated>,
        calls: Mutex<usize>,
    }

    impl MockFeedbackService {
        fn new(response: Result<FeedbackCreated>) -> Self {
            Self {
                response,
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl FeedbackService for MockFeedbackService {
        async fn create_feedback(&self, _request: &FeedbackRequest) -> Result<FeedbackCreated> {
            *self.calls.lock().unwrap() += 1;
            self.response.clone()
        }

        async fn get_feedback(&self, id: &str) -> Result<FeedbackRecord> {
            Err(PrepcallError::not_found("feedback", id))
        }
    }

    fn sample_request() -> FeedbackRequest {
        let mut transcript = TranscriptAggregator::new();
        transcript.append(Speaker::Ai, "Tell me about yourself");
        FeedbackRequest {
            session_id: "itv-1".to_string(),
            candidate_id: "cand-1".to_string(),
            transcript: transcript.entries().to_vec(),
        }
    }

    #[tokio::test]
    async fn test_success_routes_to_feedback_view() {
        let service = Arc::new(MockFeedbackService::new(Ok(FeedbackCreated {
            success: true,
            id: Some("fb-9".to_string()),
        })));
        let dispatcher = FeedbackDispatcher::new(service.clone());

        let outcome = dispatcher.dispatch(sample_request()).await;
        assert_eq!(
            outcome,
            SessionOutcome::FeedbackReady {
                feedback_id: "fb-9".to_string()
            }
        );
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn test_remote_failure_routes_home() {
        let service = Arc::new(MockFeedbackService::new(Ok(FeedbackCreated {
            success: false,
            id: None,
        })));
        let dispatcher = FeedbackDispatcher::new(service.clone());

        let outcome = dispatcher.dispatch(sample_request()).await;
        assert_eq!(outcome, SessionOutcome::ReturnHome);
    }

    #[tokio::test]
    async fn test_missing_identifier_routes_home() {
        let service = Arc::new(MockFeedbackService::new(Ok(FeedbackCreated {
            success: true,
            id: None,
        })));
        let dispatcher = FeedbackDispatcher::new(service);

        let outcome = dispatcher.dispatch(sample_request()).await;
        assert_eq!(outcome, SessionOutcome::ReturnHome);
    }

    #[tokio::test]
    async fn test_transport_error_routes_home_without_retry() {
        let service = Arc::new(MockFeedbackService::new(Err(PrepcallError::backend(
            "connection refused",
        ))));
        let dispatcher = FeedbackDispatcher::new(service.clone());

        let outcome = dispatcher.dispatch(sample_request()).await;
        assert_eq!(outcome, SessionOutcome::ReturnHome);
        // No automatic retry against the non-idempotent endpoint.
        assert_eq!(service.calls(), 1);
    }
}
