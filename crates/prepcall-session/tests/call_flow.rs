//! End-to-end flow tests: a scripted engine pushes events through the
//! driver while commands arrive over the command channel.

use async_trait::async_trait;
use prepcall_core::engine::{
    EngineCredentials, EngineEvent, SessionConfig, TranscriptKind, VoiceEngine,
};
use prepcall_core::feedback::{FeedbackCreated, FeedbackRecord, FeedbackRequest, FeedbackService};
use prepcall_core::session::{CallStatus, InterviewContext, Session, Speaker};
use prepcall_core::{PrepcallError, Result};
use prepcall_session::{
    CallSessionController, FeedbackDispatcher, SessionCommand, SessionDriver, SessionOutcome,
    SessionUpdate,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};

/// Engine whose events are pushed by the test.
struct ScriptedEngine {
    receiver: Mutex<Option<mpsc::UnboundedReceiver<EngineEvent>>>,
}

impl ScriptedEngine {
    fn new() -> (Arc<Self>, UnboundedSender<EngineEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let engine = Arc::new(Self {
            receiver: Mutex::new(Some(events_rx)),
        });
        (engine, events_tx)
    }
}

#[async_trait]
impl VoiceEngine for ScriptedEngine {
    fn subscribe(&self) -> mpsc::UnboundedReceiver<EngineEvent> {
        self.receiver
            .lock()
            .unwrap()
            .take()
            .expect("subscribe called twice")
    }

    async fn start(&self, _config: &SessionConfig) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        // The scripted engine never emits its own call-end after a stop.
        Ok(())
    }
}

struct CountingFeedbackService {
    calls: Mutex<Vec<FeedbackRequest>>,
}

impl CountingFeedbackService {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl FeedbackService for CountingFeedbackService {
    async fn create_feedback(&self, request: &FeedbackRequest) -> Result<FeedbackCreated> {
        self.calls.lock().unwrap().push(request.clone());
        Ok(FeedbackCreated {
            success: true,
            id: Some("fb-42".to_string()),
        })
    }

    async fn get_feedback(&self, id: &str) -> Result<FeedbackRecord> {
        Err(PrepcallError::not_found("feedback", id))
    }
}

fn interview_session() -> Session {
    Session::interview(
        "itv-1",
        vec!["Tell me about yourself".to_string(), "Why us?".to_string()],
        InterviewContext {
            role: "Backend Engineer".to_string(),
            level: "Senior".to_string(),
            ..Default::default()
        },
    )
}

fn credentials() -> Option<EngineCredentials> {
    Some(EngineCredentials {
        web_token: "tok".to_string(),
        generation_workflow_id: "wf".to_string(),
    })
}

fn final_transcript(speaker: Speaker, text: &str) -> EngineEvent {
    EngineEvent::Transcript {
        speaker,
        text: text.to_string(),
        kind: TranscriptKind::Final,
    }
}

async fn recv_update(updates: &mut mpsc::UnboundedReceiver<SessionUpdate>) -> SessionUpdate {
    tokio::time::timeout(Duration::from_secs(5), updates.recv())
        .await
        .expect("timed out waiting for session updates")
        .expect("update channel closed before the session ended")
}

/// Collects updates into `seen` until one matches `stop_at`.
async fn collect_until(
    updates: &mut mpsc::UnboundedReceiver<SessionUpdate>,
    seen: &mut Vec<SessionUpdate>,
    stop_at: impl Fn(&SessionUpdate) -> bool,
) {
    loop {
        let update = recv_update(updates).await;
        let done = stop_at(&update);
        seen.push(update);
        if done {
            return;
        }
    }
}

#[tokio::test]
async fn engine_call_end_produces_one_feedback_dispatch_in_order() {
    let (engine, events) = ScriptedEngine::new();
    let service = CountingFeedbackService::new();
    let controller = CallSessionController::new(
        interview_session(),
        "cand-1",
        "Alex",
        engine.clone(),
        FeedbackDispatcher::new(service.clone()),
        credentials(),
    );

    let (updates_tx, mut updates) = mpsc::unbounded_channel();
    let (driver, commands) = SessionDriver::new(controller, engine, updates_tx);
    let driver_task = tokio::spawn(driver.run());

    let mut seen = Vec::new();

    commands.send(SessionCommand::Start).unwrap();
    // Wait for the dial to be acknowledged before scripting engine events,
    // so the call-start cannot overtake the start command.
    collect_until(&mut updates, &mut seen, |update| {
        matches!(update, SessionUpdate::StatusChanged(CallStatus::Connecting))
    })
    .await;

    events.send(EngineEvent::CallStart).unwrap();
    events
        .send(final_transcript(Speaker::Ai, "Tell me about yourself"))
        .unwrap();
    events
        .send(final_transcript(Speaker::Candidate, "I build backends."))
        .unwrap();
    events.send(final_transcript(Speaker::Ai, "Thanks")).unwrap();
    events.send(EngineEvent::CallEnd).unwrap();
    // Duplicate delivery of the terminal event must be absorbed.
    events.send(EngineEvent::CallEnd).unwrap();

    collect_until(&mut updates, &mut seen, |update| {
        matches!(update, SessionUpdate::Ended(_))
    })
    .await;

    let statuses: Vec<CallStatus> = seen
        .iter()
        .filter_map(|update| match update {
            SessionUpdate::StatusChanged(status) => Some(*status),
            _ => None,
        })
        .collect();
    assert_eq!(
        statuses,
        vec![CallStatus::Connecting, CallStatus::Active, CallStatus::Finished]
    );

    let texts: Vec<String> = seen
        .iter()
        .filter_map(|update| match update {
            SessionUpdate::TranscriptAppended(entry) => Some(entry.text.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        texts,
        vec!["Tell me about yourself", "I build backends.", "Thanks"]
    );

    assert!(seen
        .iter()
        .any(|update| matches!(update, SessionUpdate::GeneratingFeedback)));
    assert_eq!(
        seen.last(),
        Some(&SessionUpdate::Ended(SessionOutcome::FeedbackReady {
            feedback_id: "fb-42".to_string()
        }))
    );

    {
        let calls = service.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].transcript.len(), 3);
    }

    commands.send(SessionCommand::Dispose).unwrap();
    driver_task.await.unwrap();
}

#[tokio::test]
async fn call_end_while_connecting_still_reports_feedback_generation() {
    let (engine, events) = ScriptedEngine::new();
    let service = CountingFeedbackService::new();
    let controller = CallSessionController::new(
        interview_session(),
        "cand-1",
        "Alex",
        engine.clone(),
        FeedbackDispatcher::new(service.clone()),
        credentials(),
    );

    let (updates_tx, mut updates) = mpsc::unbounded_channel();
    let (driver, commands) = SessionDriver::new(controller, engine, updates_tx);
    let driver_task = tokio::spawn(driver.run());

    let mut seen = Vec::new();

    commands.send(SessionCommand::Start).unwrap();
    collect_until(&mut updates, &mut seen, |update| {
        matches!(update, SessionUpdate::StatusChanged(CallStatus::Connecting))
    })
    .await;

    // The engine finalizes an utterance and drops the call before ever
    // confirming call-start. The session still finishes with a transcript,
    // so the generating-feedback indication must precede the dispatch.
    events
        .send(final_transcript(Speaker::Candidate, "Hello?"))
        .unwrap();
    events.send(EngineEvent::CallEnd).unwrap();

    collect_until(&mut updates, &mut seen, |update| {
        matches!(update, SessionUpdate::Ended(_))
    })
    .await;

    let generating_at = seen
        .iter()
        .position(|update| matches!(update, SessionUpdate::GeneratingFeedback))
        .expect("generating-feedback indication was never published");
    let ended_at = seen
        .iter()
        .position(|update| matches!(update, SessionUpdate::Ended(_)))
        .unwrap();
    assert!(generating_at < ended_at);
    assert_eq!(
        seen.last(),
        Some(&SessionUpdate::Ended(SessionOutcome::FeedbackReady {
            feedback_id: "fb-42".to_string()
        }))
    );
    assert_eq!(service.calls.lock().unwrap().len(), 1);

    commands.send(SessionCommand::Dispose).unwrap();
    driver_task.await.unwrap();
}

#[tokio::test]
async fn user_stop_finishes_and_dispatches_without_engine_call_end() {
    let (engine, events) = ScriptedEngine::new();
    let service = CountingFeedbackService::new();
    let controller = CallSessionController::new(
        interview_session(),
        "cand-1",
        "Alex",
        engine.clone(),
        FeedbackDispatcher::new(service.clone()),
        credentials(),
    );

    let (updates_tx, mut updates) = mpsc::unbounded_channel();
    let (driver, commands) = SessionDriver::new(controller, engine, updates_tx);
    let driver_task = tokio::spawn(driver.run());

    let mut seen = Vec::new();

    commands.send(SessionCommand::Start).unwrap();
    collect_until(&mut updates, &mut seen, |update| {
        matches!(update, SessionUpdate::StatusChanged(CallStatus::Connecting))
    })
    .await;

    events.send(EngineEvent::CallStart).unwrap();
    events.send(final_transcript(Speaker::Ai, "Why us?")).unwrap();
    events
        .send(final_transcript(Speaker::Candidate, "Great team."))
        .unwrap();
    // User presses End; the engine's own call-end never fires. Queued
    // transcript events are drained before the session is stopped.
    commands.send(SessionCommand::Stop).unwrap();

    collect_until(&mut updates, &mut seen, |update| {
        matches!(update, SessionUpdate::Ended(_))
    })
    .await;

    assert_eq!(
        seen.last(),
        Some(&SessionUpdate::Ended(SessionOutcome::FeedbackReady {
            feedback_id: "fb-42".to_string()
        }))
    );
    {
        let calls = service.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].transcript.len(), 2);
    }

    commands.send(SessionCommand::Dispose).unwrap();
    driver_task.await.unwrap();
}
