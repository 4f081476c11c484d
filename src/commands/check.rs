use anyhow::Result;
use tracing::{info, warn};

use crate::state::AppState;

/// Probe the model server and print the readiness report as JSON.
pub async fn check(state: &AppState) -> Result<bool> {
    let status = state.llm.check_server().await;

    println!("LLM server check");
    println!("{}", serde_json::to_string_pretty(&status)?);

    if status.ok {
        info!(model = %status.model, "LLM server is up and usable");
    } else {
        warn!(
            model = %status.model,
            chat_ok = status.chat_ok,
            model_found = status.model_found,
            "LLM server check failed"
        );
    }
    Ok(status.ok)
}
