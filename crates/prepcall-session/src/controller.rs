//! Call session state machine.
//!
//! `CallSessionController` owns one [`Session`] and drives it through
//! `Inactive -> Connecting -> Active -> Finished` in reaction to engine
//! events and user actions. All transitions execute synchronously inside
//! the handler that receives the triggering event; the event source
//! delivers events serially, so no two transitions for the same session
//! ever race.
//!
//! The terminal-state side effect (feedback dispatch or redirect) is gated
//! behind a one-shot latch owned by the controller, not behind state
//! re-evaluation: entering `Finished` once but being notified of it many
//! times still produces exactly one dispatch.

use crate::dispatcher::FeedbackDispatcher;
use crate::outcome::SessionOutcome;
use chrono::Utc;
use prepcall_core::engine::{
    EngineCredentials, EngineEvent, SessionConfig, TranscriptKind, VoiceEngine,
};
use prepcall_core::feedback::FeedbackRequest;
use prepcall_core::session::{
    CallStatus, ConnectionMonitor, ConnectionQuality, ProgressTracker, Session, SessionMode,
    Speaker, TranscriptAggregator,
};
use prepcall_core::{PrepcallError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Drives one voice interview session end to end.
pub struct CallSessionController {
    session: Session,
    transcript: TranscriptAggregator,
    progress: ProgressTracker,
    monitor: ConnectionMonitor,
    engine: Arc<dyn VoiceEngine>,
    dispatcher: FeedbackDispatcher,
    credentials: Option<EngineCredentials>,
    candidate_id: String,
    candidate_name: String,
    speaking: bool,
    feedback_in_flight: bool,
    /// One-shot idempotency latch for the terminal-state side effect.
    finish_handled: bool,
    /// Stale-callback guard: once set, events and late async results are
    /// discarded silently.
    disposed: bool,
}

impl CallSessionController {
    /// Creates a controller for a freshly created session.
    ///
    /// # Arguments
    ///
    /// * `session` - The session to drive; must be in `Inactive` state
    /// * `candidate_id` - Identifier of the candidate taking the interview
    /// * `candidate_name` - Display name forwarded to generation workflows
    /// * `engine` - The external voice engine
    /// * `dispatcher` - Feedback dispatch used on terminal state
    /// * `credentials` - Engine authentication; `None` rejects any start
    pub fn new(
        session: Session,
        candidate_id: impl Into<String>,
        candidate_name: impl Into<String>,
        engine: Arc<dyn VoiceEngine>,
        dispatcher: FeedbackDispatcher,
        credentials: Option<EngineCredentials>,
    ) -> Self {
        let total_questions = match session.mode {
            SessionMode::Interview => session.question_list.len(),
            SessionMode::Generation => 0,
        };
        Self {
            progress: ProgressTracker::new(total_questions),
            session,
            transcript: TranscriptAggregator::new(),
            monitor: ConnectionMonitor::new(),
            engine,
            dispatcher,
            credentials,
            candidate_id: candidate_id.into(),
            candidate_name: candidate_name.into(),
            speaking: false,
            feedback_in_flight: false,
            finish_handled: false,
            disposed: false,
        }
    }

    /// Requests the call to start.
    ///
    /// Ignored while a call is already being placed or live (double-dial
    /// guard). Rejected while `Inactive` when the engine credential is
    /// absent; the state is unchanged and the user may retry. A rejected
    /// connection reverts to `Inactive` with quality `Poor`.
    ///
    /// # Errors
    ///
    /// - `PrepcallError::Config` when the engine credential is missing
    /// - `PrepcallError::Internal` when the session already finished
    /// - the engine's error when the dial request is rejected
    pub async fn start(&mut self) -> Result<()> {
        if self.disposed {
            return Ok(());
        }
        if self.session.status.is_in_call() {
            tracing::debug!(session_id = %self.session.id, "start ignored; call already in progress");
            return Ok(());
        }
        if self.session.status.is_terminal() {
            return Err(PrepcallError::internal(
                "session already finished; create a new session to call again",
            ));
        }

        let credentials = self.credentials.clone().ok_or_else(|| {
            PrepcallError::config("engine credential missing; set PREPCALL_ENGINE_TOKEN")
        })?;

        self.session.status = CallStatus::Connecting;
        self.monitor.on_connecting();
        self.session.connection_quality = self.monitor.quality();
        tracing::info!(session_id = %self.session.id, "dialing voice engine");

        let config = self.session_config(&credentials);
        if let Err(err) = self.engine.start(&config).await {
            if self.disposed {
                tracing::debug!(session_id = %self.session.id, "start failure after dispose discarded");
                return Ok(());
            }
            self.session.status = CallStatus::Inactive;
            self.monitor.on_engine_error();
            self.session.connection_quality = self.monitor.quality();
            tracing::warn!(session_id = %self.session.id, error = %err, "engine rejected start");
            return Err(err);
        }
        Ok(())
    }

    /// Handles one engine event.
    ///
    /// Engine errors are converted into local state changes and never
    /// propagate; only the terminal decision is surfaced, and only once.
    pub async fn handle_event(&mut self, event: EngineEvent) -> Option<SessionOutcome> {
        if self.disposed {
            tracing::trace!(session_id = %self.session.id, "event after dispose discarded");
            return None;
        }

        match event {
            EngineEvent::CallStart => {
                if self.session.status == CallStatus::Connecting {
                    self.session.status = CallStatus::Active;
                    self.session.started_at = Some(Utc::now());
                    tracing::info!(session_id = %self.session.id, "call is live");
                } else {
                    tracing::debug!(
                        session_id = %self.session.id,
                        status = %self.session.status,
                        "call-start ignored outside CONNECTING"
                    );
                }
                None
            }
            EngineEvent::CallEnd => {
                if self.session.status == CallStatus::Inactive {
                    tracing::debug!(session_id = %self.session.id, "call-end without a call ignored");
                    return None;
                }
                self.finish().await
            }
            EngineEvent::Transcript {
                speaker,
                text,
                kind,
            } => {
                if kind == TranscriptKind::Final {
                    self.transcript.append(speaker, text);
                    if speaker == Speaker::Ai && self.session.mode == SessionMode::Interview {
                        self.progress.on_assistant_turn();
                    }
                }
                None
            }
            EngineEvent::SpeechStart => {
                self.speaking = true;
                None
            }
            EngineEvent::SpeechEnd => {
                self.speaking = false;
                None
            }
            EngineEvent::Error { message } => {
                // Non-fatal: quality degrades, the session continues. Only
                // an explicit call-end event ends the session.
                tracing::warn!(session_id = %self.session.id, %message, "engine reported an error");
                self.monitor.on_engine_error();
                self.session.connection_quality = self.monitor.quality();
                None
            }
        }
    }

    /// User-requested stop while the call is live.
    ///
    /// The stop request to the engine is best-effort: a failure is logged
    /// and the session is still forced to `Finished`, so the UI can never
    /// hang in `Active` after a user-requested end. The engine's own
    /// call-end event may or may not fire afterwards; the latch absorbs
    /// either interleaving.
    pub async fn stop(&mut self) -> Option<SessionOutcome> {
        if self.disposed || self.session.status != CallStatus::Active {
            return None;
        }
        if let Err(err) = self.engine.stop().await {
            tracing::warn!(session_id = %self.session.id, error = %err, "engine stop failed; forcing finish");
        }
        if self.disposed {
            tracing::debug!(session_id = %self.session.id, "stop resolved after dispose; discarded");
            return None;
        }
        self.finish().await
    }

    /// Marks the controller disposed.
    ///
    /// Any asynchronous result arriving afterwards is discarded silently;
    /// this is the stale-callback guard for a torn-down owning view.
    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    /// Terminal-state handling. Idempotent via the one-shot latch.
    async fn finish(&mut self) -> Option<SessionOutcome> {
        self.session.status = CallStatus::Finished;
        self.speaking = false;

        if self.finish_handled {
            tracing::debug!(session_id = %self.session.id, "duplicate terminal notification ignored");
            return None;
        }
        self.finish_handled = true;

        if self.session.mode == SessionMode::Generation {
            tracing::info!(session_id = %self.session.id, "generation session finished");
            return Some(SessionOutcome::ReturnHome);
        }
        if self.transcript.is_empty() {
            tracing::info!(session_id = %self.session.id, "finished with empty transcript; no feedback");
            return Some(SessionOutcome::ReturnHome);
        }

        let request = FeedbackRequest {
            session_id: self.session.id.clone(),
            candidate_id: self.candidate_id.clone(),
            transcript: self.transcript.entries().to_vec(),
        };

        self.feedback_in_flight = true;
        let outcome = self.dispatcher.dispatch(request).await;
        self.feedback_in_flight = false;

        if self.disposed {
            tracing::debug!(session_id = %self.session.id, "dispatch resolved after dispose; discarded");
            return None;
        }
        Some(outcome)
    }

    fn session_config(&self, credentials: &EngineCredentials) -> SessionConfig {
        match self.session.mode {
            SessionMode::Generation => SessionConfig::Generation {
                workflow_id: credentials.generation_workflow_id.clone(),
                candidate_id: self.candidate_id.clone(),
                candidate_name: self.candidate_name.clone(),
            },
            SessionMode::Interview => {
                let context = self.session.context.clone().unwrap_or_default();
                SessionConfig::Interview {
                    questions: self.session.formatted_questions(),
                    role: context.role,
                    level: context.level,
                    company: context.company,
                    job_description: context.job_description,
                }
            }
        }
    }

    /// Current lifecycle state.
    pub fn status(&self) -> CallStatus {
        self.session.status
    }

    /// The owned session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The accumulated transcript.
    pub fn transcript(&self) -> &TranscriptAggregator {
        &self.transcript
    }

    /// Question-progress display values `(current, total)`.
    pub fn progress(&self) -> (usize, usize) {
        (self.progress.current(), self.progress.total())
    }

    /// The displayed connection-quality signal.
    pub fn connection_quality(&self) -> ConnectionQuality {
        self.monitor.quality()
    }

    /// Whether the AI is currently speaking.
    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// Whether a feedback dispatch is in flight (drives the "generating
    /// feedback" indication).
    pub fn is_generating_feedback(&self) -> bool {
        self.feedback_in_flight
    }

    /// Whether reaching the terminal state now would send a feedback
    /// request. False once the terminal side effect has already run.
    pub fn will_dispatch_feedback(&self) -> bool {
        !self.disposed
            && !self.finish_handled
            && self.session.mode == SessionMode::Interview
            && !self.transcript.is_empty()
    }

    /// Time since the call went live, while or after `Active`.
    pub fn elapsed(&self) -> Option<Duration> {
        self.session
            .started_at
            .map(|started| (Utc::now() - started).to_std().unwrap_or_default())
    }
}
