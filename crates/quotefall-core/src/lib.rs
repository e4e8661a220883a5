//! quotefall-core: price-resolution waterfall for market quotes.
//!
//! One request resolves one quote. The resolver walks a fixed ladder of
//! upstream sources in order of freshness and cost, short-circuiting at the
//! first usable price; auxiliary fields (chart history, quarterly revenue,
//! ownership, simulated order flow) are attached afterwards and degrade
//! independently without failing the request.
//!
//! Layering:
//! - [`domain`]: tickers, price observations, the report envelope
//! - [`provider`]: the upstream data-source contract
//! - [`adapters`]: Yahoo Finance implementation (real and mock transports)
//! - [`resolver`]: the source waterfall
//! - [`series`] / [`enrich`]: auxiliary field builders
//! - [`service`]: the single entry point assembling the report

pub mod adapters;
pub mod config;
pub mod domain;
pub mod enrich;
pub mod error;
pub mod http_client;
pub mod provider;
pub mod resolver;
pub mod series;
pub mod service;

pub use adapters::{YahooConfig, YahooProvider};
pub use config::{DeploymentVariant, ServiceConfig, TimeZonePolicy};
pub use domain::{
    BarInterval, CloseBar, HistoryRange, Holdings, PriceObservation, PriceSource, QuoteReport,
    RevenuePoint, SimulatedFlow, Ticker, TAIWAN_SUFFIX,
};
pub use enrich::{holdings_from_snapshot, simulated_flow, SIMULATED_FLOW_LEN};
pub use error::{ResolveError, ValidationError};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient};
pub use provider::{
    FastQuote, IncomePeriod, IncomeStatement, ProviderError, ProviderErrorKind, ProviderFuture,
    QuoteProvider, SnapshotInfo,
};
pub use resolver::{resolve_price, Resolution, ResolvePolicy, ZERO_PRICE_IS_MISSING};
pub use series::{close_series, revenue_series, CHART_POINTS, CHART_WINDOW};
pub use service::{QuoteService, DEFAULT_CURRENCY, TAIWAN_FALLBACK_CURRENCY};
