//! IFRS 17 reporting server
//!
//! Loads layered configuration, connects to the database, runs migrations,
//! seeds the admin account and serves the reporting routes.

mod config;

use anyhow::Context;
use clap::Parser;
use config::{AppConfig, LogFormat, LoggingConfig};
use ifrs17_reporting::ReportingModule;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "ifrs17-server", version, about = "IFRS 17 regulatory reporting server")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, default_value = "config/ifrs17.yaml")]
    config: PathBuf,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    if cli.print_config {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    init_logging(&config.logging);
    tracing::info!(config_file = %cli.config.display(), "Starting IFRS 17 reporting server");

    let db = sea_orm::Database::connect(config.server.database_url.as_str())
        .await
        .context("connecting to the database")?;

    let module = ReportingModule::init(
        db,
        config.reporting.clone(),
        Duration::from_secs(config.server.session_ttl_secs),
    )
    .await?;

    match (&config.admin.username, &config.admin.password) {
        (Some(username), Some(password)) => {
            module
                .authenticator()
                .ensure_user(username, password)
                .await
                .map_err(|e| anyhow::anyhow!("seeding admin account: {}", e))?;
            tracing::info!(username = %username, "Admin account ready");
        }
        _ => tracing::warn!("No admin credentials configured; only existing accounts can sign in"),
    }

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, "Listening");

    axum::serve(listener, module.router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
