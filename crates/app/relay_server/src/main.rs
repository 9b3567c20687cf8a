//! Chat relay server binary.
//!
//! `relay_server relay` serves the browser-facing relay; `relay_server backend`
//! serves the chat backend the relay forwards to. Settings come from the
//! environment (and `.env`); flags override them.

use std::time::Duration;

use clap::{Parser, Subcommand};
use relay_api::config::{BackendConfig, RelayConfig};
use relay_api::{AppState, BackendState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// CLI arguments for the relay server.
#[derive(Parser, Debug)]
#[command(name = "relay_server", about = "Chat relay server", version)]
struct Args {
    /// Address to listen on; overrides `BIND_ADDR`.
    #[arg(long, global = true)]
    bind: Option<String>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Forward widget requests to the upstream backend.
    Relay {
        /// Upstream URL; overrides `RELAY_UPSTREAM_URL`.
        #[arg(long)]
        upstream_url: Option<String>,

        /// Upstream deadline in seconds; overrides `UPSTREAM_TIMEOUT_SECS`.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout_secs: Option<u64>,
    },
    /// Answer chat turns with the completion API.
    Backend {
        /// Completion model; overrides `COMPLETION_MODEL`.
        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,relay_api=debug,relay_core=debug")),
        )
        .init();

    let args = Args::parse();

    let (bind_addr, app) = match args.mode {
        Mode::Relay {
            upstream_url,
            timeout_secs,
        } => {
            let mut config = RelayConfig::from_env()?;
            if let Some(url) = upstream_url {
                config = config.with_upstream_url(&url)?;
            }
            if let Some(secs) = timeout_secs {
                config.upstream_timeout = Duration::from_secs(secs);
            }
            if let Some(bind) = args.bind {
                config.bind_addr = bind;
            }

            info!(
                upstream = %config.upstream_url,
                credential_present = config.upstream_credential.is_some(),
                timeout_secs = config.upstream_timeout.as_secs(),
                "starting relay"
            );
            if config.upstream_credential.is_none() {
                warn!("RELAY_UPSTREAM_KEY is not set");
            }

            let bind_addr = config.bind_addr.clone();
            (bind_addr, relay_api::router(AppState::new(config)?))
        }
        Mode::Backend { model } => {
            let mut config = BackendConfig::from_env()?;
            if let Some(model) = model {
                config.model = model;
            }
            if let Some(bind) = args.bind {
                config.bind_addr = bind;
            }

            info!(
                model = %config.model,
                completion_url = %config.completion_url,
                access_key_present = config.access_key.is_some(),
                completion_key_present = config.completion_api_key.is_some(),
                allowed_origins = ?config.allowed_origins,
                "starting chat backend"
            );

            let bind_addr = config.bind_addr.clone();
            (bind_addr, relay_api::backend_router(BackendState::new(config)?))
        }
    };

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_flags_parse() {
        let args = Args::try_parse_from([
            "relay_server",
            "relay",
            "--upstream-url",
            "http://127.0.0.1:5000/chat",
            "--timeout-secs",
            "10",
            "--bind",
            "0.0.0.0:8080",
        ])
        .expect("parse");
        assert_eq!(args.bind.as_deref(), Some("0.0.0.0:8080"));
        assert!(matches!(
            args.mode,
            Mode::Relay {
                timeout_secs: Some(10),
                ..
            }
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(Args::try_parse_from(["relay_server", "relay", "--timeout-secs", "0"]).is_err());
    }

    #[test]
    fn mode_is_required() {
        assert!(Args::try_parse_from(["relay_server"]).is_err());
    }
}
