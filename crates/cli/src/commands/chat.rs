//! `cowork chat`: run one request and print its events.

use std::io::Write;
use std::sync::Arc;

use cowork_agent::StreamEvent;
use cowork_config::AppConfig;
use cowork_core::session::SessionContext;

use super::serve::missing_key_message;

pub async fn run(message: String, token: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if !config.has_api_key() {
        return Err(missing_key_message().into());
    }

    let agent = Arc::new(cowork_gateway::build_agent(&config)?);
    let mut rx = agent.spawn(message, Vec::new(), SessionContext::new(token));

    let mut stdout = std::io::stdout().lock();
    let mut failed = None;
    let mut events = 0usize;
    while let Some(event) = rx.recv().await {
        events += 1;
        stdout.write_all(event.to_ndjson_line()?.as_bytes())?;
        stdout.flush()?;
        if let StreamEvent::Error { error } = event {
            failed = Some(error);
        }
    }

    tracing::debug!(events, "Event stream ended");

    match failed {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}
