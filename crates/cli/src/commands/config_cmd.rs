//! `cowork config`: show the effective configuration.

use cowork_config::AppConfig;

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("# {}", config_path().display());
    if !config.has_api_key() {
        println!("# No API key set (set GEMINI_API_KEY)");
    }
    println!("{}", config.redacted_toml());
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", config_path().display());
    Ok(())
}

fn config_path() -> std::path::PathBuf {
    AppConfig::config_dir().join("config.toml")
}
