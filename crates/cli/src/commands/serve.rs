//! `cowork serve`: start the HTTP API server.

use cowork_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    if !config.has_api_key() {
        return Err(missing_key_message().into());
    }

    println!("Cowork Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", config.model.name);
    println!("   Frontend:  {}", config.gateway.frontend_url);

    cowork_gateway::start(config).await?;

    Ok(())
}

pub fn missing_key_message() -> String {
    format!(
        "No Gemini API key configured. Set GEMINI_API_KEY (or COWORK_GEMINI_API_KEY), \
         or add api_key to {}",
        AppConfig::config_dir().join("config.toml").display()
    )
}
