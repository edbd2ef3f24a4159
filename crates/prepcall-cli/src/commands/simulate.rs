use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Args;
use prepcall_backend::{BackendConfig, HttpFeedbackService};
use prepcall_core::engine::{
    EngineCredentials, EngineEvent, SessionConfig, VoiceEngine,
};
use prepcall_core::feedback::{
    FeedbackCreated, FeedbackRecord, FeedbackRequest, FeedbackService,
};
use prepcall_core::session::{InterviewContext, Session};
use prepcall_core::PrepcallError;
use prepcall_session::{
    CallSessionController, FeedbackDispatcher, SessionCommand, SessionDriver, SessionUpdate,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};
use uuid::Uuid;

#[derive(Args)]
pub struct SimulateArgs {
    /// Path to a JSON array of engine events
    #[arg(long)]
    pub script: PathBuf,

    /// Run a generation-mode session instead of an interview
    #[arg(long)]
    pub generation: bool,

    /// Dispatch feedback to the configured backend instead of a local stub
    #[arg(long)]
    pub dispatch: bool,
}

/// Engine that replays a scripted event sequence once the call starts.
struct ScriptedEngine {
    script: Mutex<Vec<EngineEvent>>,
    events_tx: UnboundedSender<EngineEvent>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<EngineEvent>>>,
}

impl ScriptedEngine {
    fn new(script: Vec<EngineEvent>) -> Arc<Self> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            script: Mutex::new(script),
            events_tx,
            receiver: Mutex::new(Some(events_rx)),
        })
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

    async fn start(&self, _config: &SessionConfig) -> prepcall_core::Result<()> {
        for event in self.script.lock().unwrap().drain(..) {
            let _ = self.events_tx.send(event);
        }
        Ok(())
    }

    async fn stop(&self) -> prepcall_core::Result<()> {
        Ok(())
    }
}

/// Local stand-in for the backend when `--dispatch` is not passed.
struct StubFeedbackService;

#[async_trait]
impl FeedbackService for StubFeedbackService {
    async fn create_feedback(
        &self,
        _request: &FeedbackRequest,
    ) -> prepcall_core::Result<FeedbackCreated> {
        Ok(FeedbackCreated {
            success: true,
            id: Some(Uuid::new_v4().to_string()),
        })
    }

    async fn get_feedback(&self, id: &str) -> prepcall_core::Result<FeedbackRecord> {
        Err(PrepcallError::not_found("feedback", id))
    }
}

pub async fn run(args: SimulateArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.script)
        .with_context(|| format!("reading {}", args.script.display()))?;
    let script: Vec<EngineEvent> =
        serde_json::from_str(&raw).context("script must be a JSON array of engine events")?;

    let session = if args.generation {
        Session::generation(Uuid::new_v4().to_string())
    } else {
        Session::interview(
            Uuid::new_v4().to_string(),
            vec![
                "Tell me about yourself".to_string(),
                "Describe a hard bug you fixed".to_string(),
            ],
            InterviewContext {
                role: "Software Engineer".to_string(),
                level: "Mid".to_string(),
                ..Default::default()
            },
        )
    };

    let service: Arc<dyn FeedbackService> = if args.dispatch {
        Arc::new(HttpFeedbackService::new(BackendConfig::load()?))
    } else {
        Arc::new(StubFeedbackService)
    };

    // Simulation does not require real engine credentials.
    let credentials = EngineCredentials::try_from_env().unwrap_or(EngineCredentials {
        web_token: "simulated".to_string(),
        generation_workflow_id: "simulated".to_string(),
    });

    let engine = ScriptedEngine::new(script);
    let controller = CallSessionController::new(
        session,
        "simulated-candidate",
        "Simulated Candidate",
        engine.clone(),
        FeedbackDispatcher::new(service),
        Some(credentials),
    );

    let (updates_tx, mut updates) = mpsc::unbounded_channel();
    let (driver, commands) = SessionDriver::new(controller, engine, updates_tx);
    let driver_task = tokio::spawn(driver.run());

    commands.send(SessionCommand::Start)?;

    let mut stop_sent = false;
    let mut idle_ticks = 0u32;
    loop {
        match tokio::time::timeout(Duration::from_secs(2), updates.recv()).await {
            Ok(Some(update)) => {
                print_update(&update);
                match update {
                    SessionUpdate::Ended(_) => break,
                    SessionUpdate::Tick { .. } => idle_ticks += 1,
                    _ => idle_ticks = 0,
                }
                // Two quiet seconds means the script is exhausted; end the
                // session like a user would.
                if idle_ticks >= 2 && !stop_sent {
                    commands.send(SessionCommand::Stop)?;
                    stop_sent = true;
                }
            }
            Ok(None) => break,
            Err(_) if !stop_sent => {
                commands.send(SessionCommand::Stop)?;
                stop_sent = true;
            }
            Err(_) => break,
        }
    }

    let _ = commands.send(SessionCommand::Dispose);
    driver_task.await?;
    Ok(())
}

fn print_update(update: &SessionUpdate) {
    match update {
        SessionUpdate::StatusChanged(status) => println!("status: {status}"),
        SessionUpdate::TranscriptAppended(entry) => {
            println!("{:?}: {}", entry.speaker, entry.text)
        }
        SessionUpdate::Speaking(speaking) => println!("speaking: {speaking}"),
        SessionUpdate::Progress { current, total } => println!("progress: {current}/{total}"),
        SessionUpdate::QualityChanged(quality) => println!("quality: {quality:?}"),
        SessionUpdate::Tick { elapsed } => println!("elapsed: {}s", elapsed.as_secs()),
        SessionUpdate::GeneratingFeedback => println!("generating feedback..."),
        SessionUpdate::StartFailed(message) => println!("start failed: {message}"),
        SessionUpdate::Ended(outcome) => println!("ended: {outcome:?}"),
    }
}
