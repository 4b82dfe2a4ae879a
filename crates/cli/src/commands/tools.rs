//! `cowork tools`: list the tool catalog.

use cowork_config::AppConfig;
use cowork_tools::{WorkspaceServices, workspace_registry};

pub async fn run(as_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let services = WorkspaceServices::google(&config)?;
    let registry = workspace_registry(&services);
    let definitions = registry.definitions();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&definitions)?);
        return Ok(());
    }

    println!("{} tools available:\n", definitions.len());
    for def in &definitions {
        let summary = def.description.split(". ").next().unwrap_or_default();
        println!("  {:<24} {}", def.name, summary.trim_end_matches('.'));
    }

    Ok(())
}
