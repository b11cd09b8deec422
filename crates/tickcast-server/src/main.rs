//! tickcast-server: broadcast a wrapping counter to WebSocket subscribers.
//!
//! Every tick (10 ms by default) a JSON message
//! `{"timestamp":"YYYY-MM-DDTHH:MM:SS.mmm","value":N}` is pushed to every
//! client connected at `ws://<bind>:<port>/ws`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tickcast_common::TickcastError;
use tickcast_config::{validate, FailurePolicy, TickcastConfig};
use tickcast_server::{spawn_broadcast, BroadcastLoop, Lifecycle, Liveness, Registry, Server, StopReason};

#[derive(Parser)]
#[command(name = "tickcast-server", about = "Broadcast a periodic counter over WebSocket")]
struct Args {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on.
    #[arg(short, long)]
    port: Option<u16>,

    /// Interface address to bind.
    #[arg(long)]
    bind: Option<String>,

    /// Request path accepted for the WebSocket upgrade.
    #[arg(long)]
    path: Option<String>,

    /// Lowest broadcast value.
    #[arg(long, allow_negative_numbers = true)]
    value_min: Option<i64>,

    /// Highest broadcast value before wrapping.
    #[arg(long, allow_negative_numbers = true)]
    value_max: Option<i64>,

    /// Milliseconds between ticks.
    #[arg(long)]
    interval_ms: Option<u64>,

    /// fail_stop or drop_subscriber.
    #[arg(long)]
    on_send_error: Option<FailurePolicy>,
}

impl Args {
    fn apply(self, config: &mut TickcastConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }
        if let Some(path) = self.path {
            config.server.path = path;
        }
        if let Some(min) = self.value_min {
            config.broadcast.value_min = min;
        }
        if let Some(max) = self.value_max {
            config.broadcast.value_max = max;
        }
        if let Some(interval) = self.interval_ms {
            config.broadcast.interval_ms = interval;
        }
        if let Some(policy) = self.on_send_error {
            config.broadcast.on_send_error = policy;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tickcast_server=info".into()),
        )
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "tickcast-server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), TickcastError> {
    let mut config = tickcast_config::load_or_default(args.config.as_deref())?;
    args.apply(&mut config);
    validate(&config)?;

    let registry = Registry::new();
    let broadcast = spawn_broadcast(BroadcastLoop::new(
        &config.broadcast,
        registry.clone(),
        Liveness::new(),
    ));

    let server = Server::bind(&config.server, Lifecycle::new(registry)).await?;
    server
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await;

    let report = broadcast.shutdown().await?;
    match report.stopped_by {
        StopReason::Shutdown => tracing::info!(
            ticks = report.ticks,
            deliveries = report.deliveries,
            "Shut down cleanly"
        ),
        StopReason::DeliveryFailure(ref e) => tracing::warn!(
            ticks = report.ticks,
            deliveries = report.deliveries,
            error = %e,
            "Broadcast had already halted"
        ),
    }
    Ok(())
}
