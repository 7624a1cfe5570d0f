//! Date lookups over a trend provider
//!
//! These are thin accessors: no caching, no transformation. A date with no
//! data yields an empty map rather than an error.

use crate::error::TrendError;
use crate::trends::provider::{TrendMetrics, TrendProvider};
use serde_json::Value;
use std::collections::BTreeMap;

/// Averaged readings for `date` (`YYYY-MM-DD`)
///
/// Returns the first entry whose `Date` equals `date`, or an empty map.
pub fn trend_for_date(
    provider: &dyn TrendProvider,
    date: &str,
) -> Result<TrendMetrics, TrendError> {
    let entries = provider.averaged_trend()?;
    Ok(entries
        .into_iter()
        .find(|entry| entry.get("Date").and_then(Value::as_str) == Some(date))
        .unwrap_or_default())
}

/// Hourly readings for `date`, or an empty map if the date is absent
pub fn detailed_trend_for_date(
    provider: &dyn TrendProvider,
    date: &str,
) -> Result<BTreeMap<String, TrendMetrics>, TrendError> {
    let mut detailed = provider.detailed_data()?;
    Ok(detailed.remove(date).unwrap_or_default())
}
