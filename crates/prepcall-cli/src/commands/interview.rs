use anyhow::{bail, Result};
use prepcall_backend::{BackendConfig, HttpInterviewService};
use prepcall_core::interview::InterviewService;

/// Fetches and prints one interview definition.
pub async fn show(id: Option<String>, code: Option<String>) -> Result<()> {
    let service = HttpInterviewService::new(BackendConfig::load()?);

    let details = match (id, code) {
        (Some(id), _) => service.find_by_id(&id).await?,
        (None, Some(code)) => service.find_by_access_code(&code).await?,
        (None, None) => bail!("pass --id or --code"),
    };

    println!("{}", serde_json::to_string_pretty(&details)?);
    Ok(())
}
