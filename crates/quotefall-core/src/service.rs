//! Result assembly.
//!
//! `QuoteService` is the single operation the transport layer calls into:
//! normalize the ticker, run the waterfall, then attach the auxiliary
//! series and enrichment. Only the price path can fail the request; every
//! other field degrades to its default with a note in `warnings`.

use std::sync::Arc;

use crate::config::{DeploymentVariant, ServiceConfig};
use crate::enrich::{holdings_from_snapshot, simulated_flow, SIMULATED_FLOW_LEN};
use crate::provider::{ProviderError, QuoteProvider};
use crate::resolver::{resolve_price, ResolvePolicy};
use crate::series::{close_series, revenue_series, CHART_WINDOW};
use crate::{BarInterval, Holdings, QuoteReport, ResolveError, Ticker, TAIWAN_SUFFIX};

/// Currency reported when the snapshot carries none.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Region-heuristic currency for exchange-qualified Taiwan tickers when the
/// snapshot call itself fails.
pub const TAIWAN_FALLBACK_CURRENCY: &str = "TWD";

/// Substitute a default and record a degraded-field note on failure.
fn or_degraded<T>(
    result: Result<T, ProviderError>,
    fallback: T,
    field: &str,
    warnings: &mut Vec<String>,
) -> T {
    match result {
        Ok(value) => value,
        Err(error) => {
            warnings.push(format!("{field} degraded to default: {error}"));
            fallback
        }
    }
}

/// Quote resolution service over one upstream provider.
pub struct QuoteService {
    provider: Arc<dyn QuoteProvider>,
    config: ServiceConfig,
}

impl QuoteService {
    pub fn new(provider: Arc<dyn QuoteProvider>, config: ServiceConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Resolve the best available quote for a raw ticker string.
    ///
    /// Fails with [`ResolveError::PriceUnavailable`] when the waterfall is
    /// exhausted; in that case no series or enrichment calls are made. Any
    /// other upstream failure degrades its own field only.
    pub async fn resolve_quote(&self, raw: &str) -> Result<QuoteReport, ResolveError> {
        let ticker = Ticker::parse(raw)?.normalize();

        let policy = ResolvePolicy {
            snapshot_previous_close: self.config.variant.snapshot_uses_previous_close(),
            time_zone: self.config.time_zone,
        };
        let resolution = resolve_price(self.provider.as_ref(), &ticker, &policy).await;
        let Some(observation) = resolution.observation else {
            return Err(ResolveError::PriceUnavailable);
        };
        let mut warnings = resolution.notes;

        let history = or_degraded(
            self.provider
                .history(ticker.clone(), CHART_WINDOW, BarInterval::OneDay)
                .await
                .map(|bars| close_series(&bars)),
            Vec::new(),
            "history",
            &mut warnings,
        );

        let (revenue, holdings, chip) = match self.config.variant {
            DeploymentVariant::RealFinancials => {
                let revenue = or_degraded(
                    self.provider
                        .quarterly_income_statement(ticker.clone())
                        .await
                        .map(|statement| revenue_series(&statement)),
                    Vec::new(),
                    "revenue",
                    &mut warnings,
                );
                let holdings = or_degraded(
                    self.provider
                        .snapshot_info(ticker.clone())
                        .await
                        .map(|info| holdings_from_snapshot(&info)),
                    Holdings::default(),
                    "holdings",
                    &mut warnings,
                );
                (Some(revenue), Some(holdings), None)
            }
            DeploymentVariant::SimulatedChip => {
                (None, None, Some(simulated_flow(SIMULATED_FLOW_LEN)))
            }
        };

        let regional_default = if ticker.as_str().to_ascii_uppercase().contains(TAIWAN_SUFFIX) {
            TAIWAN_FALLBACK_CURRENCY
        } else {
            DEFAULT_CURRENCY
        };
        let currency = or_degraded(
            self.provider.snapshot_info(ticker.clone()).await.map(|info| {
                info.currency
                    .unwrap_or_else(|| String::from(DEFAULT_CURRENCY))
            }),
            String::from(regional_default),
            "currency",
            &mut warnings,
        );

        Ok(QuoteReport {
            ticker: ticker.display_symbol(),
            current_price: observation.price,
            currency,
            price_source: observation.source,
            history,
            revenue,
            holdings,
            chip,
            timestamp: self.config.time_zone.now_stamp(),
            price_time: observation.observed_at,
            warnings,
        })
    }
}
