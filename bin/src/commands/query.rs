//! Query command implementation.

use anyhow::Result;
use aurum_lib::lookback_from_hours;
use aurum_lib::prelude::*;

use super::open_store;
use crate::display::{Format, print_query_result};

/// Print candles of `timeframe` from the last `hours`.
pub(crate) async fn query(
    config: &ServiceConfig,
    timeframe: &str,
    hours: u32,
    format: Format,
) -> Result<()> {
    let resolution = Resolution::parse_lenient(timeframe)?;
    let lookback = lookback_from_hours(hours)?;
    let store = open_store(config)?;
    let service = RangeQueryService::new(store);

    let result = service
        .query_range_at(resolution, lookback, chrono::Utc::now())
        .await?;
    print_query_result(&result, format)
}
