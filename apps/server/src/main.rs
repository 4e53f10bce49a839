//! Tonearm Server - standalone HTTP server for the Tonearm gateway.
//!
//! Wires the core services against the live catalog and lyrics providers
//! and serves the HTTP API until Ctrl+C or SIGTERM.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tonearm_core::protocol_constants::APP_NAME;
use tonearm_core::{bind_listener, bootstrap_services, start_server};

use crate::config::ServerConfig;

/// Tonearm Server - resilient gateway in front of a music catalog.
#[derive(Parser, Debug)]
#[command(name = "tonearm-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "info", env = "TONEARM_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Bind port (overrides config file and `PORT`).
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Session credential sent to the catalog (overrides config file).
    #[arg(long, env = "TONEARM_UPSTREAM_COOKIE", hide_env_values = true)]
    upstream_cookie: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("{} Server v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config =
        ServerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(cookie) = args.upstream_cookie {
        config.upstream_cookie = Some(cookie);
    }

    log::info!(
        "Configuration: port={}, max_results={}, credential={}",
        config.port,
        config.max_results,
        if config.upstream_cookie.is_some() { "set" } else { "none" }
    );

    let core_config = config.to_core_config();
    let services = bootstrap_services(&core_config).context("Failed to bootstrap services")?;
    log::info!("Services bootstrapped successfully");

    // Warm the upstream session so the first request does not pay for it
    services.start_background_tasks();
    log::info!("Background tasks started");

    let listener = bind_listener(core_config.preferred_port)
        .await
        .context("Failed to bind HTTP listener")?;

    let mut server_handle = tokio::spawn(start_server(
        services.app_state(),
        listener,
        services.cancel_token.clone(),
    ));

    // Wait for shutdown signal or an early server exit
    let early_exit = tokio::select! {
        _ = shutdown_signal() => {
            log::info!("Shutdown signal received, cleaning up...");
            None
        }
        result = &mut server_handle => Some(result),
    };

    services.shutdown();

    let outcome = match early_exit {
        Some(result) => result,
        None => server_handle.await,
    };
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => log::error!("Server error: {}", e),
        Err(e) => log::error!("Server task failed: {}", e),
    }

    log::info!("Shutdown complete");
    Ok(())
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn port_flag_leaves_env_to_config_loader() {
        let command = Args::command();
        let port = command
            .get_arguments()
            .find(|arg| arg.get_id() == "port")
            .unwrap();
        assert!(port.get_env().is_none());
    }

    #[test]
    fn port_flag_overrides() {
        let args = Args::try_parse_from(["tonearm-server", "-p", "4000"]).unwrap();
        assert_eq!(args.port, Some(4000));
    }
}
