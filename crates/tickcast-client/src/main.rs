//! tickcast-watch: print what a tickcast server is broadcasting.

use std::process::ExitCode;

use clap::Parser;
use tickcast_client::{watch, RingBuffer, Sample, WatchOptions, DEFAULT_CAPACITY};

#[derive(Parser)]
#[command(name = "tickcast-watch", about = "Subscribe to a tickcast server")]
struct Args {
    /// WebSocket URL of the server.
    #[arg(short, long, default_value = "ws://localhost:8765/ws")]
    url: String,

    /// Stop after this many messages.
    #[arg(short, long)]
    limit: Option<usize>,

    /// Log progress every N messages (0 disables).
    #[arg(long, default_value_t = 100)]
    summary_every: usize,

    /// How many of the most recent samples to print on exit.
    #[arg(long, default_value_t = 100)]
    show: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tickcast_client=info".into()),
        )
        .init();

    let args = Args::parse();
    let options = WatchOptions {
        limit: args.limit,
        summary_every: args.summary_every,
        capacity: DEFAULT_CAPACITY,
    };
    let mut buffer = RingBuffer::new(options.capacity);

    let outcome = tokio::select! {
        result = watch(&args.url, &options, &mut buffer) => result.map(|_| ()),
        _ = tokio::signal::ctrl_c() => Ok(()),
    };

    print_samples(&buffer, args.show);

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "tickcast-watch failed");
            ExitCode::FAILURE
        }
    }
}

fn print_samples(buffer: &RingBuffer<Sample>, show: usize) {
    let recent = buffer.last(show);
    if !recent.is_empty() {
        println!("Last {} samples:", recent.len());
        for sample in recent {
            println!("{} - {}", sample.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"), sample.value);
        }
    }
    match buffer.latest() {
        Some(latest) => println!(
            "Latest: time {} value {}",
            latest.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            latest.value
        ),
        None => println!("No samples received"),
    }
}
