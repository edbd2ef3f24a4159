use anyhow::Result;
use prepcall_backend::{BackendConfig, HttpFeedbackService};
use prepcall_core::feedback::FeedbackService;

/// Fetches and prints one feedback record.
pub async fn get(id: &str) -> Result<()> {
    let service = HttpFeedbackService::new(BackendConfig::load()?);
    let record = service.get_feedback(id).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
