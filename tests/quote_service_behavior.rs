//! Behavior tests for the quote service: report assembly, degraded fields,
//! deployment variants, and the serialized wire contract.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use time::{Date, Month};

use quotefall_core::series::TOTAL_REVENUE;
use quotefall_core::{
    BarInterval, CloseBar, FastQuote, HistoryRange, IncomePeriod, IncomeStatement, PriceSource,
    ProviderError, ProviderFuture, QuoteProvider, QuoteService, ResolveError, ServiceConfig,
    SnapshotInfo, Ticker, ValidationError, SIMULATED_FLOW_LEN,
};

#[derive(Default)]
struct StubProvider {
    snapshot: Option<SnapshotInfo>,
    fast: Option<FastQuote>,
    intraday: Option<Vec<CloseBar>>,
    daily: Option<Vec<CloseBar>>,
    chart: Option<Vec<CloseBar>>,
    income: Option<IncomeStatement>,
    chart_calls: AtomicUsize,
    income_calls: AtomicUsize,
}

impl QuoteProvider for StubProvider {
    fn snapshot_info<'a>(&'a self, _ticker: Ticker) -> ProviderFuture<'a, SnapshotInfo> {
        let response = self.snapshot.clone();
        Box::pin(async move {
            response.ok_or_else(|| ProviderError::unavailable("stub: snapshot down"))
        })
    }

    fn fast_quote<'a>(&'a self, _ticker: Ticker) -> ProviderFuture<'a, FastQuote> {
        let response = self.fast;
        Box::pin(
            async move { response.ok_or_else(|| ProviderError::unavailable("stub: quote down")) },
        )
    }

    fn history<'a>(
        &'a self,
        _ticker: Ticker,
        range: HistoryRange,
        interval: BarInterval,
    ) -> ProviderFuture<'a, Vec<CloseBar>> {
        let response = match (range, interval) {
            (HistoryRange::OneDay, BarInterval::OneMinute) => self.intraday.clone(),
            (HistoryRange::OneDay, BarInterval::OneDay) => self.daily.clone(),
            (HistoryRange::ThreeMonths, _) => {
                self.chart_calls.fetch_add(1, Ordering::SeqCst);
                self.chart.clone()
            }
        };
        Box::pin(
            async move { response.ok_or_else(|| ProviderError::unavailable("stub: history down")) },
        )
    }

    fn quarterly_income_statement<'a>(
        &'a self,
        _ticker: Ticker,
    ) -> ProviderFuture<'a, IncomeStatement> {
        self.income_calls.fetch_add(1, Ordering::SeqCst);
        let response = self.income.clone();
        Box::pin(
            async move { response.ok_or_else(|| ProviderError::unavailable("stub: income down")) },
        )
    }
}

fn taiwan_snapshot() -> SnapshotInfo {
    SnapshotInfo {
        current_price: Some(580.5),
        regular_market_price: Some(580.0),
        previous_close: Some(575.0),
        regular_market_time: Some(0),
        currency: Some(String::from("TWD")),
        held_percent_institutions: Some(0.78),
        held_percent_insiders: Some(0.01),
    }
}

fn quarterly_income() -> IncomeStatement {
    let mut statement = IncomeStatement::default();
    statement.insert(
        TOTAL_REVENUE,
        vec![
            IncomePeriod {
                period_end: Date::from_calendar_date(2024, Month::June, 30).expect("valid"),
                value: 2.0e9,
            },
            IncomePeriod {
                period_end: Date::from_calendar_date(2024, Month::March, 31).expect("valid"),
                value: 1.0e9,
            },
        ],
    );
    statement
}

fn chart_bars(n: usize) -> Vec<CloseBar> {
    (0..n)
        .map(|i| CloseBar {
            ts: i as i64 * 86_400,
            close: 500.0 + i as f64,
        })
        .collect()
}

fn service(provider: StubProvider, config: ServiceConfig) -> QuoteService {
    QuoteService::new(Arc::new(provider), config)
}

#[tokio::test]
async fn taiwan_numeric_ticker_resolves_a_full_report() {
    // Given a healthy upstream for a Taiwan-listed symbol
    let provider = StubProvider {
        snapshot: Some(taiwan_snapshot()),
        chart: Some(chart_bars(66)),
        income: Some(quarterly_income()),
        ..StubProvider::default()
    };

    // When a bare four-digit ticker is resolved
    let report = service(provider, ServiceConfig::default())
        .resolve_quote("2330")
        .await
        .expect("report resolved");

    // Then the exchange suffix is applied and every field is populated
    assert_eq!(report.ticker, "2330.TW");
    assert_eq!(report.current_price, 580.5);
    assert_eq!(report.currency, "TWD");
    assert_eq!(report.price_source, PriceSource::Snapshot);
    assert_eq!(report.price_time.as_deref(), Some("1970/01/01 08:00:00"));
    assert_eq!(report.history.len(), 60);
    assert_eq!(report.history.last().copied(), Some(565.0));
    let revenue = report.revenue.expect("revenue present");
    assert_eq!(revenue.len(), 2);
    assert_eq!(revenue[0].date, "2024-Q1");
    let holdings = report.holdings.expect("holdings present");
    assert_eq!(holdings.institutions, 0.78);
    assert!(report.chip.is_none());
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn unresolvable_price_fails_before_any_auxiliary_call() {
    // Given a provider where every price source fails but auxiliary data exists
    let provider = StubProvider {
        chart: Some(chart_bars(10)),
        income: Some(quarterly_income()),
        ..StubProvider::default()
    };
    let provider = Arc::new(provider);
    let svc = QuoteService::new(provider.clone(), ServiceConfig::default());

    // When resolution is attempted
    let error = svc.resolve_quote("AAPL").await.expect_err("must fail");

    // Then the not-found error surfaces and no auxiliary fetch was made
    assert_eq!(error, ResolveError::PriceUnavailable);
    assert!(error.is_not_found());
    assert_eq!(provider.chart_calls.load(Ordering::SeqCst), 0);
    assert_eq!(provider.income_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn auxiliary_failures_degrade_with_warnings() {
    // Given a healthy snapshot but failing chart and income feeds
    let provider = StubProvider {
        snapshot: Some(taiwan_snapshot()),
        ..StubProvider::default()
    };

    // When the report is resolved
    let report = service(provider, ServiceConfig::default())
        .resolve_quote("2330.TW")
        .await
        .expect("price path still succeeds");

    // Then degraded fields carry defaults and each failure leaves a note
    assert!(report.history.is_empty());
    assert_eq!(report.revenue.as_deref(), Some(&[][..]));
    assert_eq!(report.holdings.expect("present").institutions, 0.78);
    assert!(report.warnings.iter().any(|w| w.starts_with("history degraded")));
    assert!(report.warnings.iter().any(|w| w.starts_with("revenue degraded")));
}

#[tokio::test]
async fn currency_falls_back_by_region_when_snapshot_fails() {
    // Given a provider where only the fast quote works
    let taiwan = StubProvider {
        fast: Some(FastQuote {
            last_price: Some(580.5),
        }),
        ..StubProvider::default()
    };
    let us = StubProvider {
        fast: Some(FastQuote {
            last_price: Some(231.2),
        }),
        ..StubProvider::default()
    };

    // When tickers from each region are resolved
    let tw_report = service(taiwan, ServiceConfig::default())
        .resolve_quote("2330")
        .await
        .expect("resolved");
    let us_report = service(us, ServiceConfig::default())
        .resolve_quote("AAPL")
        .await
        .expect("resolved");

    // Then the region heuristic picks the currency, and the note uses the
    // same degraded-field format as every other auxiliary field
    assert_eq!(tw_report.currency, "TWD");
    assert_eq!(us_report.currency, "USD");
    assert!(tw_report
        .warnings
        .iter()
        .any(|w| w.starts_with("currency degraded to default:")));
    assert!(us_report
        .warnings
        .iter()
        .any(|w| w.starts_with("currency degraded to default:")));
}

#[tokio::test]
async fn chip_variant_emits_simulated_flow_only() {
    // Given the simulated-chip deployment
    let provider = StubProvider {
        snapshot: Some(taiwan_snapshot()),
        chart: Some(chart_bars(10)),
        income: Some(quarterly_income()),
        ..StubProvider::default()
    };
    let provider = Arc::new(provider);
    let svc = QuoteService::new(provider.clone(), ServiceConfig::simulated());

    // When a report is resolved
    let report = svc.resolve_quote("2330").await.expect("resolved");

    // Then chip data replaces revenue and holdings entirely
    assert!(report.revenue.is_none());
    assert!(report.holdings.is_none());
    let chip = report.chip.expect("chip present");
    assert!(chip.simulated);
    assert_eq!(chip.foreign.len(), SIMULATED_FLOW_LEN);
    assert_eq!(chip.trust.len(), SIMULATED_FLOW_LEN);
    assert_eq!(chip.dealer.len(), SIMULATED_FLOW_LEN);
    assert!(chip.foreign.iter().all(|v| (-1000..=1000).contains(v)));
    assert!(chip.trust.iter().all(|v| (-500..=500).contains(v)));
    assert!(chip.dealer.iter().all(|v| (-200..=200).contains(v)));
    assert_eq!(provider.income_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn report_serializes_the_wire_contract() {
    // Given a clean full report
    let provider = StubProvider {
        snapshot: Some(taiwan_snapshot()),
        chart: Some(chart_bars(5)),
        income: Some(quarterly_income()),
        ..StubProvider::default()
    };
    let report = service(provider, ServiceConfig::default())
        .resolve_quote("2330")
        .await
        .expect("resolved");

    // When it is serialized
    let value = serde_json::to_value(&report).expect("serializes");
    let object = value.as_object().expect("object");

    // Then the wire names and optional-field elisions hold
    assert_eq!(object["currentPrice"], 580.5);
    assert_eq!(object["ticker"], "2330.TW");
    assert_eq!(object["price_source"], "snapshot");
    assert_eq!(object["price_time"], "1970/01/01 08:00:00");
    assert!(object["history"].is_array());
    assert_eq!(object["revenue"][0]["date_full"], "2024-03");
    assert!(!object.contains_key("chip"));
    assert!(!object.contains_key("warnings"));
}

#[tokio::test]
async fn invalid_tickers_are_rejected_before_any_fetch() {
    // Given any provider
    let svc = service(StubProvider::default(), ServiceConfig::default());

    // When malformed tickers are submitted
    let empty = svc.resolve_quote("").await.expect_err("must fail");
    let symbol = svc.resolve_quote("AAPL$").await.expect_err("must fail");

    // Then validation errors surface, not the not-found condition
    assert_eq!(
        empty,
        ResolveError::Validation(ValidationError::EmptyTicker)
    );
    assert!(!empty.is_not_found());
    assert!(matches!(
        symbol,
        ResolveError::Validation(ValidationError::TickerInvalidChar { ch: '$', index: 4 })
    ));
}
