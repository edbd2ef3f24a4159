//! Feedback service boundary.
//!
//! Defines the contract for the remote feedback-creation endpoint. The
//! scoring performed by the backend is opaque to this crate; a retrieved
//! record keeps unrecognized fields as raw JSON.

use crate::error::Result;
use crate::session::TranscriptEntry;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The payload sent to the backend when a finished session requests
/// feedback. At most one request is issued per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    /// The interview session this feedback is for.
    pub session_id: String,
    /// The candidate who took the interview.
    pub candidate_id: String,
    /// Full ordered transcript of the conversation.
    pub transcript: Vec<TranscriptEntry>,
}

/// The backend's acknowledgement of a feedback-creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackCreated {
    /// Whether the backend accepted the request.
    pub success: bool,
    /// Identifier of the created feedback record, present on success.
    #[serde(default)]
    pub id: Option<String>,
}

/// A stored feedback record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: String,
    pub interview_id: String,
    pub candidate_id: String,
    /// Scoring and assessment fields; their shape belongs to the backend.
    #[serde(flatten)]
    pub details: serde_json::Value,
}

/// Remote feedback-creation and lookup operations.
#[async_trait]
pub trait FeedbackService: Send + Sync {
    /// Creates a feedback record from a finished session's transcript.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success HTTP status,
    /// or a malformed response body.
    async fn create_feedback(&self, request: &FeedbackRequest) -> Result<FeedbackCreated>;

    /// Fetches a previously created feedback record.
    ///
    /// # Errors
    ///
    /// Returns `PrepcallError::NotFound` when no record exists for `id`.
    async fn get_feedback(&self, id: &str) -> Result<FeedbackRecord>;
}
