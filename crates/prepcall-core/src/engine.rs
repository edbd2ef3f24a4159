//! Voice engine boundary.
//!
//! The external real-time speech/conversation service is treated as a black
//! box: it is started with a [`SessionConfig`], stopped on request, and it
//! pushes [`EngineEvent`]s over a channel obtained from [`VoiceEngine::subscribe`].
//! Dropping the receiver unsubscribes.

use crate::error::Result;
use crate::session::Speaker;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;
use tokio::sync::mpsc::UnboundedReceiver;

/// Environment variable holding the engine's web token.
pub const ENGINE_TOKEN_ENV: &str = "PREPCALL_ENGINE_TOKEN";
/// Environment variable holding the question-generation workflow identifier.
pub const ENGINE_WORKFLOW_ENV: &str = "PREPCALL_ENGINE_WORKFLOW_ID";

/// Whether a transcript event carries a finalized or an interim utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptKind {
    /// The utterance is complete and will not be revised.
    Final,
    /// Interim recognition output; superseded by a later event.
    Partial,
}

/// Events delivered by the voice engine, in the order it produces them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EngineEvent {
    /// The engine confirmed the call is live.
    CallStart,
    /// The engine ended the call. Authoritative terminator.
    CallEnd,
    /// A recognized utterance.
    Transcript {
        speaker: Speaker,
        text: String,
        kind: TranscriptKind,
    },
    /// The AI started speaking.
    SpeechStart,
    /// The AI stopped speaking.
    SpeechEnd,
    /// A non-fatal engine error. Does not end the call by itself.
    Error { message: String },
}

/// Configuration handed to the engine when a call is started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SessionConfig {
    /// Run a fixed question list with role/level/company context.
    Interview {
        /// Question list pre-rendered for the engine prompt.
        questions: String,
        role: String,
        level: String,
        #[serde(default)]
        company: Option<String>,
        #[serde(default)]
        job_description: Option<String>,
    },
    /// Generate new questions conversationally via a workflow.
    Generation {
        workflow_id: String,
        candidate_id: String,
        candidate_name: String,
    },
}

/// Authentication material required before a call may be placed.
///
/// A start request is rejected while these are absent; the caller may
/// provide them and press start again.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineCredentials {
    /// Web token authenticating this client against the engine.
    pub web_token: String,
    /// Workflow identifier used by generation-mode sessions.
    pub generation_workflow_id: String,
}

impl EngineCredentials {
    /// Loads credentials from the environment.
    ///
    /// Returns `None` when `PREPCALL_ENGINE_TOKEN` is not set. The workflow
    /// identifier is optional in the environment and defaults to empty,
    /// since interview-mode sessions never use it.
    pub fn try_from_env() -> Option<Self> {
        let web_token = env::var(ENGINE_TOKEN_ENV).ok()?;
        if web_token.trim().is_empty() {
            return None;
        }
        let generation_workflow_id = env::var(ENGINE_WORKFLOW_ENV).unwrap_or_default();
        Some(Self {
            web_token,
            generation_workflow_id,
        })
    }
}

/// The external speech/conversation engine.
///
/// Operations are single-shot and are not retried by this crate. Events are
/// delivered serially on the channel returned by [`subscribe`](Self::subscribe);
/// dropping that receiver unsubscribes.
#[async_trait]
pub trait VoiceEngine: Send + Sync {
    /// Obtains the engine's event stream.
    fn subscribe(&self) -> UnboundedReceiver<EngineEvent>;

    /// Asks the engine to place a call with the given configuration.
    ///
    /// Resolving `Ok` means the dial request was accepted; the call is only
    /// live once a [`EngineEvent::CallStart`] arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the connection.
    async fn start(&self, config: &SessionConfig) -> Result<()>;

    /// Asks the engine to end the current call. Best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine could not be reached; callers treat
    /// this as non-fatal and terminate the session themselves.
    async fn stop(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_event_wire_tags() {
        let event: EngineEvent = serde_json::from_str(
            r#"{"type":"transcript","speaker":"ai","text":"Hello","kind":"final"}"#,
        )
        .unwrap();
        match event {
            EngineEvent::Transcript {
                speaker,
                text,
                kind,
            } => {
                assert_eq!(speaker, Speaker::Ai);
                assert_eq!(text, "Hello");
                assert_eq!(kind, TranscriptKind::Final);
            }
            other => panic!("unexpected event: {other:?}"),
        }

        let end: EngineEvent = serde_json::from_str(r#"{"type":"call-end"}"#).unwrap();
        assert!(matches!(end, EngineEvent::CallEnd));
    }

    #[test]
    fn test_session_config_serializes_mode_tag() {
        let config = SessionConfig::Generation {
            workflow_id: "wf-1".to_string(),
            candidate_id: "cand-1".to_string(),
            candidate_name: "Alex".to_string(),
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["mode"], "generation");
        assert_eq!(json["workflow_id"], "wf-1");
    }
}
