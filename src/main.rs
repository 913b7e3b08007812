use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use scribble_runtime::config::RobotConfig;

/// Control runtime for a differential-drive drawing robot.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// JSON configuration file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the loop rate in Hz
    #[arg(long)]
    hz: Option<u64>,
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => match RobotConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Config error: {}", e);
                std::process::exit(1);
            }
        },
        None => RobotConfig::default(),
    };
    if let Some(hz) = args.hz {
        config.loop_hz = hz;
    }

    if let Err(e) = scribble_runtime::runtime::run(config).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
