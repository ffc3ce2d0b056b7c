//! syndicate-chatd - hosts the syndicate chat service.
//!
//! Loads configuration, starts the operator HTTP endpoint and keeps the room
//! registry alive until Ctrl-C. Chat transports embed [`ChatService`] and call
//! into it directly.

use std::sync::Arc;
use syndicate_chat::ChatService;
use syndicate_chat::config::{Config, LogFormat, validation};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        eprintln!("Failed to load config {config_path}: {e}");
        e
    })?;

    init_tracing(config.server.log_format);

    if let Err(errors) = validation::validate(&config) {
        for e in &errors {
            error!(path = %config_path, error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "{} configuration error(s) in {config_path}",
            errors.len()
        ));
    }

    info!(
        server = %config.server.name,
        retention_cap = config.limits.retention_cap,
        max_message_len = config.limits.max_message_len,
        "Starting syndicate-chatd"
    );

    syndicate_chat::metrics::init();
    let service = Arc::new(ChatService::from_config(&config));

    if let Some(port) = config.server.metrics_port {
        tokio::spawn(syndicate_chat::http::run_http_server(port, service.clone()));
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    service.shutdown();

    Ok(())
}
