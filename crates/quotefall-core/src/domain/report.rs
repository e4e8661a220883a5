use serde::{Deserialize, Serialize};

use super::PriceSource;

/// One quarter of revenue, labeled for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenuePoint {
    /// Calendar-quarter label, e.g. `2024-Q3`.
    pub date: String,
    /// Period end month, e.g. `2024-09`.
    pub date_full: String,
    pub value: f64,
}

/// Ownership percentages in `[0, 1]`.
///
/// A missing upstream value degrades to 0.0. That zero is a declared
/// approximation, not a measured figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Holdings {
    pub institutions: f64,
    pub insiders: f64,
}

/// Synthesized daily order-flow series (foreign/trust/dealer channels).
///
/// Not derived from any real feed; `simulated` is always true so consumers
/// can label the data accordingly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedFlow {
    pub foreign: Vec<i64>,
    pub trust: Vec<i64>,
    pub dealer: Vec<i64>,
    pub simulated: bool,
}

impl SimulatedFlow {
    pub fn new(foreign: Vec<i64>, trust: Vec<i64>, dealer: Vec<i64>) -> Self {
        Self {
            foreign,
            trust,
            dealer,
            simulated: true,
        }
    }
}

/// Assembled response for one resolution request.
///
/// Built fresh per request and never persisted. Exactly one of the
/// `revenue`/`holdings` pair or `chip` is populated, depending on the
/// deployment variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteReport {
    pub ticker: String,
    #[serde(rename = "currentPrice")]
    pub current_price: f64,
    pub currency: String,
    pub price_source: PriceSource,
    pub history: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<Vec<RevenuePoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holdings: Option<Holdings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chip: Option<SimulatedFlow>,
    /// Request wall-clock time under the configured zone policy.
    pub timestamp: String,
    /// Observation time of the winning price source, when derivable.
    pub price_time: Option<String>,
    /// Degraded-field notes. Empty on a fully clean response.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
