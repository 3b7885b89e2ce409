#![forbid(unsafe_code)]

//! `claude-presence`: Discord Rich Presence daemon for Claude Code.
//!
//! Connects to the local Discord client, then keeps the published activity
//! in sync with the active Claude Code session until a termination signal
//! arrives.

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use claude_presence::ipc::{IpcClient, TransportResolver};
use claude_presence::scheduler::UpdateScheduler;
use claude_presence::session::{SessionContext, SessionSelector};
use claude_presence::{AppError, PresenceConfig, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "claude-presence", about = "Discord Rich Presence for Claude Code", version, long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the Claude configuration directory (default `~/.claude`).
    #[arg(long)]
    claude_dir: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("claude-presence starting");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = match args.config {
        Some(ref path) => PresenceConfig::load_from_path(path)?,
        None => PresenceConfig::default(),
    };
    if let Some(dir) = args.claude_dir {
        config.claude_dir = Some(dir);
    }

    let status_path = config.status_path()?;
    let projects_dir = config.projects_dir()?;
    info!(
        status_file = %status_path.display(),
        projects_dir = %projects_dir.display(),
        "configuration loaded"
    );

    // ── Connect to Discord ──────────────────────────────
    let resolver = TransportResolver::detect();
    let mut client = IpcClient::new(config.client_id.clone());
    if let Err(err) = client.connect(&resolver).await {
        error!(%err, "could not connect to Discord; is the desktop client running?");
        return Err(err);
    }
    info!("connected to Discord");

    // ── Signal handling ─────────────────────────────────
    let ct = CancellationToken::new();
    let signal_ct = ct.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        signal_ct.cancel();
    });

    // ── Run the update loop ─────────────────────────────
    let scheduler = UpdateScheduler::new(
        SessionSelector::new(status_path, projects_dir),
        client,
        SessionContext::new(Utc::now()),
        config.display.clone(),
        config.poll_interval(),
    );
    scheduler.run(ct).await?;

    info!("claude-presence shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
