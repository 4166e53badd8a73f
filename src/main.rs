use anyhow::Result;
use clap::{Parser, Subcommand};
use foreignrate::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (default)
    Serve {
        /// Address to listen on, overriding the configuration
        #[arg(short, long)]
        listen: Option<String>,
    },
    /// Create default configuration
    Setup,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(Commands::Serve { listen }) => {
            foreignrate::run(cli.config_path.as_deref(), listen.as_deref()).await
        }
        None => foreignrate::run(cli.config_path.as_deref(), None).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = foreignrate::core::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
listen: "0.0.0.0:8000"

providers:
  primary:
    base_url: "https://open.er-api.com/v6/latest/"
  secondary:
    base_url: "https://open.er-api.com/v6/latest/"
  timeout_secs: 10

geo:
  base_url: "http://ip-api.com/json"
  overrides:
    "127.0.0.1": "US"

limits:
  window_secs: 60
  max_requests: 30

cache:
  rate_ttl_secs: 86400

history:
  enabled: false
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
