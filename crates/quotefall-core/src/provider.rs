//! Quote provider capability contract.
//!
//! The upstream data source is modeled as four independent capability calls
//! keyed by a normalized ticker. Every call either returns a value or fails
//! with a [`ProviderError`]; nothing throws past this boundary and nothing
//! here retries. Callers catch each failure at its own call site and decide
//! whether to fall through (the resolver) or degrade the field (the
//! assembler).

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{BarInterval, CloseBar, HistoryRange, Ticker};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Transport failure, upstream rejection, or rate limiting.
    Unavailable,
    /// The upstream payload could not be decoded.
    Parse,
    /// The payload decoded but carried none of the expected data.
    MissingData,
}

/// Structured error for a single upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
}

impl ProviderError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Parse,
            message: message.into(),
        }
    }

    pub fn missing_data(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::MissingData,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::Unavailable => "provider.unavailable",
            ProviderErrorKind::Parse => "provider.parse",
            ProviderErrorKind::MissingData => "provider.missing_data",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ProviderError {}

/// Broad, possibly-stale key/value quote payload. Every field is optional;
/// consumers pick what they need and fall back on their own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub current_price: Option<f64>,
    pub regular_market_price: Option<f64>,
    pub previous_close: Option<f64>,
    /// Unix seconds of the regular-market observation, when present.
    pub regular_market_time: Option<i64>,
    pub currency: Option<String>,
    pub held_percent_institutions: Option<f64>,
    pub held_percent_insiders: Option<f64>,
}

/// Narrow low-latency quote. No timestamp guarantee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FastQuote {
    pub last_price: Option<f64>,
}

/// One reported period of an income-statement line item. The value may be
/// NaN when the upstream feed reported the period without a figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncomePeriod {
    pub period_end: Date,
    pub value: f64,
}

/// Quarterly income statement: line item name to ordered period rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncomeStatement {
    rows: BTreeMap<String, Vec<IncomePeriod>>,
}

impl IncomeStatement {
    pub fn insert(&mut self, line_item: impl Into<String>, periods: Vec<IncomePeriod>) {
        self.rows.insert(line_item.into(), periods);
    }

    pub fn row(&self, line_item: &str) -> Option<&[IncomePeriod]> {
        self.rows.get(line_item).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Boxed future returned by provider capability calls.
pub type ProviderFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Upstream quote source contract.
///
/// Implementations must be `Send + Sync` and must never retry internally:
/// the waterfall relies on single-attempt semantics per source.
pub trait QuoteProvider: Send + Sync {
    /// Fetch the broad snapshot payload for a ticker.
    fn snapshot_info<'a>(&'a self, ticker: Ticker) -> ProviderFuture<'a, SnapshotInfo>;

    /// Fetch the lightweight last-price quote.
    fn fast_quote<'a>(&'a self, ticker: Ticker) -> ProviderFuture<'a, FastQuote>;

    /// Fetch close-only history bars for the given window and granularity.
    fn history<'a>(
        &'a self,
        ticker: Ticker,
        range: HistoryRange,
        interval: BarInterval,
    ) -> ProviderFuture<'a, Vec<CloseBar>>;

    /// Fetch the quarterly income statement.
    fn quarterly_income_statement<'a>(
        &'a self,
        ticker: Ticker,
    ) -> ProviderFuture<'a, IncomeStatement>;
}
