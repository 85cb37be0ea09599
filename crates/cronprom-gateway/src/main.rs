//! cronprom: push gateway for cron job metrics.
//!
//! - `serve`: load config, build the metric collector, serve `/api/v1/push`,
//!   `/metrics` and `/health` until SIGINT/SIGTERM.
//! - `push`: send one metric update to a running gateway.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use cronprom_core::error::{CronPromError, Result};
use cronprom_gateway::build_info::BuildInfo;
use cronprom_gateway::push::{self, PushRequest};
use cronprom_gateway::{app_state, config, router};

#[derive(Parser)]
#[command(name = "cronprom", version = BuildInfo::current().version_string(), about = "Push gateway for cron job metrics")]
struct Cli {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[arg(long, global = true, env = "CRONPROM_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the push API and the metrics endpoint.
    Serve {
        #[arg(long, env = "CRONPROM_CONFIG_PATH")]
        config_path: PathBuf,
    },
    /// Push a metric update to a running gateway.
    Push(PushArgs),
}

#[derive(Args)]
struct PushArgs {
    /// Push endpoint, e.g. http://localhost:8080/api/v1/push
    #[arg(long, env = "CRONPROM_URL")]
    url: String,

    /// Name of the metric to update.
    #[arg(long)]
    name: String,

    /// Metric type (gauge, counter, histogram, summary).
    #[arg(long = "type")]
    kind: String,

    /// Value to update the metric with.
    #[arg(long, allow_hyphen_values = true)]
    value: f64,

    /// Label in the form key=value (repeatable).
    #[arg(long = "label")]
    labels: Vec<String>,
}

impl From<PushArgs> for PushRequest {
    fn from(a: PushArgs) -> Self {
        Self {
            url: a.url,
            name: a.name,
            kind: a.kind,
            value: a.value,
            labels: a.labels,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let res = match cli.command {
        Command::Serve { config_path } => serve(&config_path).await,
        Command::Push(args) => push::push(&args.into()).await,
    };

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, code = e.client_code().as_str(), "cronprom failed");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config_path: &Path) -> Result<()> {
    // Registry build happens before the listener is bound.
    let cfg = config::load_from_file(config_path)?;
    let listen = cfg.web.listen_addr()?;
    tracing::info!(config = %config_path.display(), "configuration loaded");

    let state = app_state::AppState::new(cfg, BuildInfo::current())?;
    let version = state.build_info().version_string();
    let refresh_interval = state.cfg().global.refresh_interval;
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(listen.as_str())
        .await
        .map_err(|e| CronPromError::Internal(format!("failed to bind {listen}: {e}")))?;
    tracing::info!(
        %listen,
        %version,
        refresh_interval = ?refresh_interval,
        "cronprom starting"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CronPromError::Internal(format!("server failed: {e}")))?;

    tracing::info!("cronprom stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!(signal = "SIGINT", "shutting down"),
        _ = terminate => tracing::info!(signal = "SIGTERM", "shutting down"),
    }
}
