/// Trend provider interface and date lookups
pub mod lookup;
pub mod provider;

pub use lookup::{detailed_trend_for_date, trend_for_date};
pub use provider::{DetailedData, JsonTrendProvider, TrendMetrics, TrendProvider};
