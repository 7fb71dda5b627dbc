//! Mood statistics for the Lilo app.
//!
//! Raw items fetched from the backend are normalized into [`MoodRecord`]s and
//! projected into a per-day calendar, a trend series and top-N rankings. The
//! aggregation functions are pure; [`services::StatsService`] is the only part
//! that talks to the network.

pub mod daily;
pub mod error;
pub mod normalize;
pub mod ranking;
pub mod report;
pub mod services;
pub mod trend;

mod test_utils;

pub use daily::{DailyAggregate, DailyAggregates, DayRule, MoodDistribution, aggregate_daily};
pub use error::{StatsError, StatsResult};
pub use lilo_client::Mood;
pub use normalize::{MoodRecord, Normalized, normalize_item, normalize_items};
pub use ranking::{DEFAULT_TOP_N, RankedValue, top_drinks, top_emotions, top_n};
pub use report::{ReportOptions, Scope, StatsReport, report_schema};
pub use trend::{TrendPoint, TrendValue, build_trend};

/// Install the process-wide tracing subscriber used by the binaries.
///
/// The filter comes from `LILO_LOG_LEVEL`, then `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() -> String {
    let log_env = std::env::var("LILO_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    // keep HTTP internals quiet unless asked for
    let combined_filter = format!("{log_env},hyper=warn,reqwest=warn");
    let env_filter = tracing_subscriber::EnvFilter::try_new(combined_filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,hyper=warn,reqwest=warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    log_env
}

/// Report options from `LILO_TOP_N`, `LILO_TREND` and `LILO_UTC_OFFSET_MINUTES`.
pub fn options_from_env_with<F>(mut get: F) -> StatsResult<ReportOptions>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut options = ReportOptions::default();
    if let Some(raw) = get("LILO_TOP_N") {
        options.top_n = raw
            .trim()
            .parse()
            .map_err(|_| StatsError::Validation(format!("LILO_TOP_N must be an integer, got {raw:?}")))?;
    }
    if let Some(raw) = get("LILO_TREND") {
        options.trend_value = parse_trend_value(&raw)?;
    }
    if let Some(raw) = get("LILO_UTC_OFFSET_MINUTES") {
        options.day_rule = raw
            .trim()
            .parse::<i32>()
            .ok()
            .and_then(DayRule::from_offset_minutes)
            .ok_or_else(|| StatsError::Validation(format!("invalid UTC offset {raw:?}")))?;
    }
    Ok(options)
}

pub fn parse_trend_value(raw: &str) -> StatsResult<TrendValue> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "average" | "avg" => Ok(TrendValue::Average),
        "majority" => Ok(TrendValue::Majority),
        other => Err(StatsError::Validation(format!(
            "trend must be `average` or `majority`, got {other:?}"
        ))),
    }
}
