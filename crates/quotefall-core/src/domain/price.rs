use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Waterfall step that produced a price, recorded for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Snapshot,
    FastQuote,
    IntradayHistory,
    DailyHistory,
}

impl PriceSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::FastQuote => "fast_quote",
            Self::IntradayHistory => "intraday_history",
            Self::DailyHistory => "daily_history",
        }
    }
}

impl Display for PriceSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved price. Exists only when the waterfall succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub price: f64,
    /// Formatted observation time, when the winning source could supply one.
    pub observed_at: Option<String>,
    pub source: PriceSource,
}

/// Close-only history bar as delivered by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloseBar {
    /// Unix timestamp in seconds.
    pub ts: i64,
    pub close: f64,
}

/// Lookback window for history requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryRange {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "3mo")]
    ThreeMonths,
}

impl HistoryRange {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::ThreeMonths => "3mo",
        }
    }
}

/// Bar granularity for history requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarInterval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "1d")]
    OneDay,
}

impl BarInterval {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::OneDay => "1d",
        }
    }
}
