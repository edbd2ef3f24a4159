use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "prepcall")]
#[command(about = "PrepCall developer CLI - backend queries and session simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interview lookups against the backend
    Interview {
        #[command(subcommand)]
        action: InterviewAction,
    },
    /// Feedback lookups against the backend
    Feedback {
        #[command(subcommand)]
        action: FeedbackAction,
    },
    /// Replay a scripted engine event file through a real session
    Simulate(commands::simulate::SimulateArgs),
}

#[derive(Subcommand)]
enum InterviewAction {
    /// Print an interview definition
    Show {
        /// Interview identifier
        #[arg(long, conflicts_with = "code")]
        id: Option<String>,
        /// Access code
        #[arg(long)]
        code: Option<String>,
    },
}

#[derive(Subcommand)]
enum FeedbackAction {
    /// Print a feedback record
    Get { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Interview { action } => match action {
            InterviewAction::Show { id, code } => commands::interview::show(id, code).await?,
        },
        Commands::Feedback { action } => match action {
            FeedbackAction::Get { id } => commands::feedback::get(&id).await?,
        },
        Commands::Simulate(args) => commands::simulate::run(args).await?,
    }

    Ok(())
}
