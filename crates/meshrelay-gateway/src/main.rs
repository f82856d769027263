//! meshrelay gateway binary.
//!
//! - `serve` (default): HTTP ingest, WebSocket event stream, ops endpoints
//! - `decode`: decode one hex envelope and print the JSON event
//!
//! stdout carries only program output (relay lines or the decoded event);
//! logs go to stderr.

use std::net::SocketAddr;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::io::AsyncWriteExt;
use tracing_subscriber::{fmt, EnvFilter};

use meshrelay_core::crypto::{ChannelKey, DEFAULT_KEY_SENTINEL};
use meshrelay_core::error::{MeshRelayError, Result};
use meshrelay_gateway::{app_state::AppState, config, router};

#[derive(Debug, Parser)]
#[command(name = "meshrelay-gateway", version, about = "Mesh radio envelope relay")]
struct Cli {
    /// Path to the YAML config.
    #[arg(long, default_value = "meshrelay.yaml")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the gateway.
    Serve,
    /// Decode one envelope given as hex.
    Decode {
        #[arg(long)]
        hex: String,
        /// Channel key (base64); empty string for an unencrypted channel.
        #[arg(long, default_value = DEFAULT_KEY_SENTINEL)]
        key: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let res = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&cli.config).await,
        Command::Decode { hex, key } => decode_one(&hex, &key),
    };

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.code().as_str(), error = %e, "meshrelay-gateway failed");
            ExitCode::FAILURE
        }
    }
}

fn decode_one(hex_frame: &str, key: &str) -> Result<()> {
    let bytes = hex::decode(hex_frame.trim())
        .map_err(|e| MeshRelayError::EnvelopeParse(format!("invalid hex: {e}")))?;
    let key = ChannelKey::parse(key)?;
    let event = meshrelay_core::decode(&bytes, Some(&key));
    println!("{}", event.to_json());
    Ok(())
}

async fn serve(config_path: &str) -> Result<()> {
    let cfg = config::load_from_file(config_path)?;
    let listen: SocketAddr = cfg
        .gateway
        .listen
        .parse()
        .map_err(|e| MeshRelayError::BadConfig(format!("gateway.listen: {e}")))?;

    let state = AppState::new(cfg)?;
    if let Some(mut lines) = state.attach_chat_relay() {
        // Chat lines go to stdout, CRLF-terminated, for the chat client.
        tokio::spawn(async move {
            let mut out = tokio::io::stdout();
            while let Some(line) = lines.recv().await {
                let framed = format!("{line}\r\n");
                if out.write_all(framed.as_bytes()).await.is_err() || out.flush().await.is_err() {
                    tracing::warn!("chat relay output closed");
                    break;
                }
            }
        });
    }

    let app = router::build_router(state.clone());

    tracing::info!(%listen, "meshrelay-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| MeshRelayError::Internal(format!("bind {listen}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| MeshRelayError::Internal(format!("server: {e}")))?;

    tracing::info!("meshrelay-gateway stopped");
    Ok(())
}

async fn shutdown_signal(state: AppState) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "ctrl-c handler failed");
    }
    tracing::info!("shutdown signal received, draining");
    state.set_draining();
    // Let open event streams notice and close.
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
}
