//! Display utilities and output formatting for the aurum CLI.

use anyhow::Result;
use aurum_lib::prelude::*;
use aurum_lib::{QueryResult, WindowOutcome};
use clap::ValueEnum;

/// Output format for query results.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Table,
    Json,
}

/// Print a query result to stdout in the given format.
pub(crate) fn print_query_result(result: &QueryResult, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(result)?),
        Format::Table => {
            println!(
                "{:<22} {:>12} {:>12} {:>12} {:>12} {:>12}",
                "TIMESTAMP", "OPEN", "HIGH", "LOW", "CLOSE", "VOLUME"
            );
            println!("{}", "-".repeat(88));
            for row in &result.data {
                println!(
                    "{:<22} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.2}",
                    row.timestamp, row.open, row.high, row.low, row.close, row.volume
                );
            }
            println!("\n{} {} candle(s)", result.count, result.timeframe);
        }
    }
    Ok(())
}

/// Print a one-line summary per aggregation window of a cycle.
pub(crate) fn print_cycle_status(status: &CycleStatus) {
    match status {
        CycleStatus::Succeeded { timestamp, report } => {
            println!("Ingested 1min candle at {}", TimeKey::from_datetime(*timestamp));
            for window in &report.windows {
                match window {
                    WindowOutcome::Written(candle) => println!(
                        "  {:<5} written at {} (O {:.4} H {:.4} L {:.4} C {:.4} V {:.2})",
                        candle.resolution,
                        candle.key(),
                        candle.open,
                        candle.high,
                        candle.low,
                        candle.close,
                        candle.volume
                    ),
                    WindowOutcome::NoData { resolution, close } => println!(
                        "  {resolution:<5} no data for window closing {}",
                        TimeKey::from_datetime(*close)
                    ),
                    WindowOutcome::Failed {
                        resolution, error, ..
                    } => println!("  {resolution:<5} failed: {error}"),
                }
            }
        }
        CycleStatus::Failed { kind, message } => println!("Cycle failed ({kind}): {message}"),
    }
}
