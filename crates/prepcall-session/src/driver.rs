//! Session event loop.
//!
//! The driver is the only place engine events are pumped: it selects over
//! the engine's event stream, a user command channel, and a one-second
//! elapsed-time tick that is produced only while the call is `Active`.
//! The controller itself never polls.

use crate::controller::CallSessionController;
use crate::outcome::SessionOutcome;
use prepcall_core::engine::{EngineEvent, VoiceEngine};
use prepcall_core::session::{CallStatus, ConnectionQuality, TranscriptEntry};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// User actions delivered to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Place the call.
    Start,
    /// End the call (best-effort stop, then forced finish).
    Stop,
    /// Tear the session down; late events are discarded.
    Dispose,
}

/// State changes published to the owning view.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    StatusChanged(CallStatus),
    TranscriptAppended(TranscriptEntry),
    Speaking(bool),
    Progress { current: usize, total: usize },
    QualityChanged(ConnectionQuality),
    Tick { elapsed: Duration },
    GeneratingFeedback,
    StartFailed(String),
    Ended(SessionOutcome),
}

/// Pumps engine events and user commands through a controller, publishing
/// `SessionUpdate`s for display.
pub struct SessionDriver {
    controller: CallSessionController,
    engine: Arc<dyn VoiceEngine>,
    commands: UnboundedReceiver<SessionCommand>,
    updates: UnboundedSender<SessionUpdate>,
}

impl SessionDriver {
    /// Creates a driver and the command sender used to drive it.
    pub fn new(
        controller: CallSessionController,
        engine: Arc<dyn VoiceEngine>,
        updates: UnboundedSender<SessionUpdate>,
    ) -> (Self, UnboundedSender<SessionCommand>) {
        let (command_tx, commands) = mpsc::unbounded_channel();
        (
            Self {
                controller,
                engine,
                commands,
                updates,
            },
            command_tx,
        )
    }

    /// Runs the event loop until the session is disposed or both input
    /// channels close.
    ///
    /// Dropping the engine receiver on exit is the unsubscribe.
    pub async fn run(mut self) {
        let mut events = self.engine.subscribe();
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        Some(SessionCommand::Start) => self.handle_start().await,
                        Some(SessionCommand::Stop) => {
                            // Utterances the engine finalized before the stop
                            // request must still make it into the transcript,
                            // and a racing call-end wins harmlessly against
                            // the finish latch.
                            self.drain_pending(&mut events).await;
                            let before = self.controller.status();
                            let will_dispatch = before == CallStatus::Active
                                && self.controller.will_dispatch_feedback();
                            if will_dispatch {
                                let _ = self.updates.send(SessionUpdate::GeneratingFeedback);
                            }
                            let outcome = self.controller.stop().await;
                            if self.controller.status() != before {
                                let _ = self.updates.send(SessionUpdate::StatusChanged(
                                    self.controller.status(),
                                ));
                            }
                            if let Some(outcome) = outcome {
                                let _ = self.updates.send(SessionUpdate::Ended(outcome));
                            }
                        }
                        Some(SessionCommand::Dispose) | None => {
                            self.controller.dispose();
                            break;
                        }
                    }
                }
                event = events.recv() => {
                    match event {
                        Some(event) => self.handle_engine_event(event).await,
                        // Engine closed its stream; nothing more will arrive.
                        None => break,
                    }
                }
                _ = ticker.tick(), if self.controller.status() == CallStatus::Active => {
                    if let Some(elapsed) = self.controller.elapsed() {
                        let _ = self.updates.send(SessionUpdate::Tick { elapsed });
                    }
                }
            }
        }
    }

    async fn handle_start(&mut self) {
        let before = self.controller.status();
        if let Err(err) = self.controller.start().await {
            let _ = self.updates.send(SessionUpdate::StartFailed(err.to_string()));
        }
        if self.controller.status() != before {
            let _ = self
                .updates
                .send(SessionUpdate::StatusChanged(self.controller.status()));
        }
        let _ = self.updates.send(SessionUpdate::QualityChanged(
            self.controller.connection_quality(),
        ));
    }

    async fn handle_engine_event(&mut self, event: EngineEvent) {
        let before_status = self.controller.status();
        let before_speaking = self.controller.is_speaking();
        let before_len = self.controller.transcript().len();
        let before_quality = self.controller.connection_quality();

        // The controller ignores a call-end only while Inactive; every other
        // state reaches the terminal handler and may dispatch.
        let finishing = matches!(event, EngineEvent::CallEnd)
            && before_status != CallStatus::Inactive
            && self.controller.will_dispatch_feedback();
        if finishing {
            let _ = self.updates.send(SessionUpdate::GeneratingFeedback);
        }

        let outcome = self.controller.handle_event(event).await;

        if self.controller.status() != before_status {
            let _ = self
                .updates
                .send(SessionUpdate::StatusChanged(self.controller.status()));
        }
        if self.controller.is_speaking() != before_speaking {
            let _ = self
                .updates
                .send(SessionUpdate::Speaking(self.controller.is_speaking()));
        }
        if self.controller.transcript().len() != before_len {
            if let Some(entry) = self.controller.transcript().last() {
                let _ = self
                    .updates
                    .send(SessionUpdate::TranscriptAppended(entry.clone()));
            }
            let (current, total) = self.controller.progress();
            let _ = self.updates.send(SessionUpdate::Progress { current, total });
        }
        if self.controller.connection_quality() != before_quality {
            let _ = self.updates.send(SessionUpdate::QualityChanged(
                self.controller.connection_quality(),
            ));
        }
        if let Some(outcome) = outcome {
            let _ = self.updates.send(SessionUpdate::Ended(outcome));
        }
    }

    /// Applies engine events that are already queued, without waiting.
    async fn drain_pending(&mut self, events: &mut UnboundedReceiver<EngineEvent>) {
        while let Ok(event) = events.try_recv() {
            self.handle_engine_event(event).await;
        }
    }
}
