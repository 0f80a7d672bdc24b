//! aurum CLI - OHLCV candle ingestion, roll-up and range queries.

use anyhow::Result;
use aurum_lib::prelude::*;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

use display::Format;

#[derive(Parser)]
#[command(name = "aurum")]
#[command(about = "Single-instrument OHLCV candle service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Data directory. Overrides AURUM_DATA_DIR.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the latest minute once and roll it up
    Ingest,

    /// Ingest on a fixed schedule until interrupted
    Run {
        /// Seconds between cycles. Overrides AURUM_INGEST_INTERVAL_SECS.
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Serve the HTTP query endpoint
    Serve {
        /// Bind address. Overrides AURUM_BIND.
        #[arg(long)]
        bind: Option<String>,

        /// Port. Overrides AURUM_PORT.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print stored candles for a lookback window
    Query {
        /// Timeframe (1min, 5min, 1h)
        #[arg(short, long, default_value = "1min")]
        timeframe: String,

        /// Lookback in hours
        #[arg(long, default_value = "24")]
        hours: u32,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: Format,
    },

    /// Delete expired candles
    Purge,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    init_tracing(cli.verbose);

    let mut config = ServiceConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }

    match command {
        Commands::Ingest => commands::ingest::ingest(&config).await,
        Commands::Run { interval } => {
            if let Some(secs) = interval.filter(|secs| *secs > 0) {
                config.ingest_interval = std::time::Duration::from_secs(secs);
            }
            commands::run::run(&config).await
        }
        Commands::Serve { bind, port } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(port) = port {
                config.port = port;
            }
            commands::serve::serve(&config).await
        }
        Commands::Query {
            timeframe,
            hours,
            format,
        } => commands::query::query(&config, &timeframe, hours, format).await,
        Commands::Purge => commands::purge::purge(&config).await,
    }
}
