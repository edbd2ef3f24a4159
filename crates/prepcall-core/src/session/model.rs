//! Session domain model.
//!
//! This module contains the core `Session` entity that represents one
//! attempt at a voice-driven interview conversation.

use super::quality::ConnectionQuality;
use super::status::CallStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a session drives the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Produces new interview questions conversationally. No feedback is
    /// generated for this mode.
    Generation,
    /// Runs a fixed question list and produces feedback at the end.
    Interview,
}

/// Role/level/company context handed to the engine for interview sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewContext {
    pub role: String,
    pub level: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
}

/// One attempt at a voice interview.
///
/// A session is created when the caller requests a call and discarded when
/// the owning view goes away or a new session is requested. There is no
/// persistence: the session lives exactly as long as its controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque identifier, supplied by the caller.
    pub id: String,
    /// Conversation mode.
    pub mode: SessionMode,
    /// Lifecycle state.
    pub status: CallStatus,
    /// Set on entering `Active`; `None` before.
    pub started_at: Option<DateTime<Utc>>,
    /// Ordered question list, fixed at creation. Empty in generation mode.
    pub question_list: Vec<String>,
    /// Displayed connection-quality signal.
    pub connection_quality: ConnectionQuality,
    /// Interview context for the engine prompt; `None` in generation mode.
    pub context: Option<InterviewContext>,
}

impl Session {
    /// Creates an interview session over a fixed question list.
    pub fn interview(
        id: impl Into<String>,
        question_list: Vec<String>,
        context: InterviewContext,
    ) -> Self {
        Self {
            id: id.into(),
            mode: SessionMode::Interview,
            status: CallStatus::Inactive,
            started_at: None,
            question_list,
            connection_quality: ConnectionQuality::Excellent,
            context: Some(context),
        }
    }

    /// Creates a question-generation session.
    pub fn generation(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            mode: SessionMode::Generation,
            status: CallStatus::Inactive,
            started_at: None,
            question_list: Vec::new(),
            connection_quality: ConnectionQuality::Excellent,
            context: None,
        }
    }

    /// Renders the fixed question list in the form the engine prompt
    /// expects: one `-- <question>` line per question.
    pub fn formatted_questions(&self) -> String {
        self.question_list
            .iter()
            .map(|question| format!("-- {question}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
