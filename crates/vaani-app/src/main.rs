mod cli;

use std::time::Duration;

use clap::Parser;

use vaani_api::{start_server, AppState};
use vaani_core::config::VaaniConfig;

use cli::CliArgs;

/// Drop widget sessions that have gone quiet.
async fn session_sweep_loop(state: AppState, idle_secs: u64) {
    let max_idle = Duration::from_secs(idle_secs);
    let mut interval = tokio::time::interval(Duration::from_secs((idle_secs / 4).clamp(1, 60)));

    tracing::info!(idle_secs, "Session sweep started");

    loop {
        interval.tick().await;
        let expired = state.expire_idle_sessions(max_idle);
        if expired > 0 {
            tracing::debug!(expired, remaining = state.session_count(), "Idle sessions dropped");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Read the file before tracing starts so its log level can apply.
    let config_file = args.resolve_config_path();
    let loaded = config_file
        .exists()
        .then(|| VaaniConfig::load(&config_file));
    let file_level = match &loaded {
        Some(Ok(config)) => config.server.log_level.clone(),
        _ => VaaniConfig::default().server.log_level,
    };

    // Tracing. RUST_LOG wins over the flag and the file.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.resolve_log_level(&file_level))),
        )
        .init();

    tracing::info!("Starting Vaani v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match loaded {
        Some(Ok(config)) => {
            tracing::info!(path = %config_file.display(), "Configuration loaded");
            config
        }
        Some(Err(e)) => {
            tracing::warn!(path = %config_file.display(), error = %e, "Invalid configuration file, using defaults");
            VaaniConfig::default()
        }
        None => {
            tracing::info!(path = %config_file.display(), "No configuration file, using defaults");
            VaaniConfig::default()
        }
    };

    config.server.host = args.resolve_host(&config.server.host);
    config.server.port = args.resolve_port(config.server.port);
    config.provider.api_key = cli::resolve_api_key(&config.provider.api_key);

    if let Err(e) = config.validate() {
        if args.check {
            tracing::error!(error = %e, "Configuration check failed");
            return Err(e.into());
        }
        tracing::warn!(error = %e, "Widget configuration has problems");
    }
    if args.check {
        tracing::info!("Configuration OK");
        return Ok(());
    }

    if config.provider.has_api_key() {
        tracing::info!("Provider API key configured");
    } else {
        tracing::warn!("SARVAM_API_KEY not set: relay endpoints will answer 503 and sessions will use fallback replies");
    }

    let port = config.server.port;
    let idle_secs = config.server.session_idle_secs;
    let state = AppState::new(config)?;
    if idle_secs > 0 {
        tokio::spawn(session_sweep_loop(state.clone(), idle_secs));
    }
    if let Err(e) = start_server(state).await {
        tracing::error!(error = %e, "Server stopped");
        tracing::error!("Try: VAANI_PORT={} cargo run -p vaani-app", port.saturating_add(1));
        return Err(e.into());
    }

    Ok(())
}
