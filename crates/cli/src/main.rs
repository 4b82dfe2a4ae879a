//! Cowork CLI, the main entry point.
//!
//! Commands:
//! - `serve`   Start the HTTP gateway
//! - `chat`    Run a single request and print its event stream
//! - `tools`   List the tool catalog
//! - `config`  Show the effective configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "cowork",
    about = "Cowork: an AI assistant for Gmail, Calendar and Drive",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Send one message to the agent and print the events as NDJSON
    Chat {
        /// The user message
        #[arg(short, long)]
        message: String,

        /// Google OAuth access token used for Gmail, Calendar and Drive
        #[arg(short, long, env = "COWORK_ACCESS_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// List the tools the agent can call
    Tools {
        /// Print full definitions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration (secrets redacted)
    Config {
        /// Only print the config file path
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so `chat` output stays machine-readable.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Chat { message, token } => commands::chat::run(message, token).await?,
        Commands::Tools { json } => commands::tools::run(json).await?,
        Commands::Config { path } => {
            if path {
                commands::config_cmd::path().await?
            } else {
                commands::config_cmd::show().await?
            }
        }
    }

    Ok(())
}
