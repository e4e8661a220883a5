//! Yahoo Finance adapter.
//!
//! Implements [`QuoteProvider`] against Yahoo's unofficial endpoints:
//! `v10 quoteSummary` for the snapshot payload, `v7 finance/quote` for the
//! fast quote, `v8 finance/chart` for history bars, and the
//! fundamentals-timeseries endpoint for quarterly revenue rows. A mock mode
//! backed by [`NoopHttpClient`] serves deterministic seeded payloads for
//! offline runs and tests.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use time::{Date, Month, OffsetDateTime};

use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient, ReqwestHttpClient};
use crate::provider::{
    FastQuote, IncomePeriod, IncomeStatement, ProviderError, QuoteProvider, SnapshotInfo,
};
use crate::series::{OPERATING_REVENUE, TOTAL_REVENUE};
use crate::{BarInterval, CloseBar, HistoryRange, Ticker};

const QUOTE_SUMMARY_MODULES: &str = "price,financialData,summaryDetail,defaultKeyStatistics";
const CRUMB_ENDPOINTS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const REFERER: &str = "https://finance.yahoo.com/";
const CRUMB_FILE: &str = "yahoo-crumb";

/// Startup configuration for the adapter.
///
/// `cache_dir`, when set, is where the session crumb is persisted between
/// process runs. Passed explicitly at construction; the adapter holds no
/// process-global state.
#[derive(Debug, Clone, Default)]
pub struct YahooConfig {
    pub cache_dir: Option<PathBuf>,
    pub timeout_ms: Option<u64>,
}

impl YahooConfig {
    fn timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or(10_000)
    }
}

/// Crumb token cache. Yahoo's quote endpoints require a session cookie
/// (kept in the transport's jar) plus a crumb query parameter.
struct YahooAuth {
    crumb: Mutex<Option<String>>,
    cache_file: Option<PathBuf>,
}

impl YahooAuth {
    fn new(cache_dir: Option<&PathBuf>) -> Self {
        let cache_file = cache_dir.map(|dir| dir.join(CRUMB_FILE));
        let crumb = cache_file
            .as_deref()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .map(|raw| raw.trim().to_owned())
            .filter(|raw| !raw.is_empty());

        Self {
            crumb: Mutex::new(crumb),
            cache_file,
        }
    }

    fn cached(&self) -> Option<String> {
        self.crumb.lock().ok().and_then(|guard| guard.clone())
    }

    fn store(&self, crumb: &str) {
        if let Ok(mut guard) = self.crumb.lock() {
            *guard = Some(crumb.to_owned());
        }
        if let Some(path) = &self.cache_file {
            if let Some(dir) = path.parent() {
                let _ = std::fs::create_dir_all(dir);
            }
            let _ = std::fs::write(path, crumb);
        }
    }

    fn invalidate(&self) {
        if let Ok(mut guard) = self.crumb.lock() {
            *guard = None;
        }
    }

    async fn crumb(
        &self,
        http_client: &Arc<dyn HttpClient>,
        timeout_ms: u64,
    ) -> Result<String, ProviderError> {
        if let Some(crumb) = self.cached() {
            return Ok(crumb);
        }

        // Visiting fc.yahoo.com seeds the session cookies in the jar.
        let cookie_request = HttpRequest::get("https://fc.yahoo.com")
            .with_header("referer", REFERER)
            .with_timeout_ms(timeout_ms);
        let _ = http_client.execute(cookie_request).await;

        for endpoint in CRUMB_ENDPOINTS {
            let request = HttpRequest::get(endpoint)
                .with_header("referer", REFERER)
                .with_timeout_ms(timeout_ms);

            match http_client.execute(request).await {
                Ok(response) if response.is_success() => {
                    let body = response.body.trim();
                    if body.is_empty()
                        || body.contains("<html")
                        || body.contains("<!DOCTYPE")
                        || body.len() >= 100
                        || body.contains(' ')
                    {
                        continue;
                    }
                    self.store(body);
                    return Ok(body.to_owned());
                }
                _ => continue,
            }
        }

        Err(ProviderError::unavailable(
            "failed to obtain yahoo crumb from any endpoint",
        ))
    }
}

/// Yahoo adapter supporting real API calls and deterministic mock mode.
pub struct YahooProvider {
    http_client: Arc<dyn HttpClient>,
    auth: YahooAuth,
    config: YahooConfig,
    use_real_api: bool,
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::mock()
    }
}

impl YahooProvider {
    /// Adapter backed by a real reqwest transport.
    pub fn new(config: YahooConfig) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), config)
    }

    /// Adapter serving deterministic offline payloads.
    pub fn mock() -> Self {
        Self::with_http_client(Arc::new(NoopHttpClient), YahooConfig::default())
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: YahooConfig) -> Self {
        let use_real_api = !http_client.is_mock();
        let auth = YahooAuth::new(config.cache_dir.as_ref());
        Self {
            http_client,
            auth,
            config,
            use_real_api,
        }
    }

    async fn fetch(&self, url: &str) -> Result<String, ProviderError> {
        let request = HttpRequest::get(url)
            .with_header("referer", REFERER)
            .with_timeout_ms(self.config.timeout_ms());

        let response = self.http_client.execute(request).await.map_err(|error| {
            ProviderError::unavailable(format!("yahoo transport error: {}", error.message()))
        })?;

        if response.status == 401 || response.status == 429 {
            // Stale session; the next call will re-auth. No retry here.
            self.auth.invalidate();
            return Err(ProviderError::unavailable(format!(
                "yahoo rejected request with status {}",
                response.status
            )));
        }

        if !response.is_success() {
            return Err(ProviderError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        Ok(response.body)
    }

    async fn real_snapshot_info(&self, ticker: &Ticker) -> Result<SnapshotInfo, ProviderError> {
        let crumb = self
            .auth
            .crumb(&self.http_client, self.config.timeout_ms())
            .await?;
        let url = format!(
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{}?modules={}&crumb={}",
            urlencoding::encode(ticker.as_str()),
            QUOTE_SUMMARY_MODULES,
            urlencoding::encode(&crumb)
        );
        let body = self.fetch(&url).await?;
        parse_snapshot_body(&body)
    }

    async fn real_fast_quote(&self, ticker: &Ticker) -> Result<FastQuote, ProviderError> {
        let crumb = self
            .auth
            .crumb(&self.http_client, self.config.timeout_ms())
            .await?;
        let url = format!(
            "https://query1.finance.yahoo.com/v7/finance/quote?symbols={}&fields=regularMarketPrice&crumb={}",
            urlencoding::encode(ticker.as_str()),
            urlencoding::encode(&crumb)
        );
        let body = self.fetch(&url).await?;
        parse_fast_quote_body(&body)
    }

    async fn real_history(
        &self,
        ticker: &Ticker,
        range: HistoryRange,
        interval: BarInterval,
    ) -> Result<Vec<CloseBar>, ProviderError> {
        let url = format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{}?range={}&interval={}",
            urlencoding::encode(ticker.as_str()),
            range.as_str(),
            interval.as_str()
        );
        let body = self.fetch(&url).await?;
        parse_chart_body(&body)
    }

    async fn real_income_statement(
        &self,
        ticker: &Ticker,
    ) -> Result<IncomeStatement, ProviderError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let two_years = 2 * 366 * 86_400;
        let url = format!(
            "https://query1.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries/{}?type=quarterlyTotalRevenue,quarterlyOperatingRevenue&period1={}&period2={}",
            urlencoding::encode(ticker.as_str()),
            now - two_years,
            now
        );
        let body = self.fetch(&url).await?;
        parse_timeseries_body(&body)
    }
}

impl QuoteProvider for YahooProvider {
    fn snapshot_info<'a>(
        &'a self,
        ticker: Ticker,
    ) -> Pin<Box<dyn Future<Output = Result<SnapshotInfo, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            if self.use_real_api {
                self.real_snapshot_info(&ticker).await
            } else {
                self.fetch("https://query1.finance.yahoo.com/v10/finance/quoteSummary")
                    .await?;
                Ok(mock_snapshot(&ticker))
            }
        })
    }

    fn fast_quote<'a>(
        &'a self,
        ticker: Ticker,
    ) -> Pin<Box<dyn Future<Output = Result<FastQuote, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            if self.use_real_api {
                self.real_fast_quote(&ticker).await
            } else {
                self.fetch("https://query1.finance.yahoo.com/v7/finance/quote")
                    .await?;
                Ok(FastQuote {
                    last_price: Some(mock_base_price(&ticker) - 0.1),
                })
            }
        })
    }

    fn history<'a>(
        &'a self,
        ticker: Ticker,
        range: HistoryRange,
        interval: BarInterval,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<CloseBar>, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            if self.use_real_api {
                self.real_history(&ticker, range, interval).await
            } else {
                self.fetch("https://query1.finance.yahoo.com/v8/finance/chart")
                    .await?;
                Ok(mock_history(&ticker, range, interval))
            }
        })
    }

    fn quarterly_income_statement<'a>(
        &'a self,
        ticker: Ticker,
    ) -> Pin<Box<dyn Future<Output = Result<IncomeStatement, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            if self.use_real_api {
                self.real_income_statement(&ticker).await
            } else {
                self.fetch("https://query1.finance.yahoo.com/ws/fundamentals-timeseries")
                    .await?;
                Ok(mock_income_statement(&ticker))
            }
        })
    }
}

// ============================================================================
// Response parsing
// ============================================================================

/// Numeric field that arrives either bare or wrapped as `{"raw": ...}`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum RawNum {
    Plain(f64),
    Wrapped {
        #[serde(default)]
        raw: Option<f64>,
    },
}

impl RawNum {
    fn value(self) -> Option<f64> {
        let raw = match self {
            Self::Plain(value) => Some(value),
            Self::Wrapped { raw } => raw,
        };
        raw.filter(|value| value.is_finite())
    }
}

fn opt_value(field: Option<RawNum>) -> Option<f64> {
    field.and_then(RawNum::value)
}

fn check_api_error(error: &serde_json::Value, endpoint: &str) -> Result<(), ProviderError> {
    if error.is_null() {
        return Ok(());
    }
    Err(ProviderError::unavailable(format!(
        "yahoo {endpoint} API error: {error}"
    )))
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryData,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryData {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    error: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(rename = "financialData", default)]
    financial_data: Option<FinancialDataModule>,
    #[serde(rename = "summaryDetail", default)]
    summary_detail: Option<SummaryDetailModule>,
    #[serde(rename = "defaultKeyStatistics", default)]
    default_key_statistics: Option<KeyStatisticsModule>,
}

#[derive(Debug, Deserialize)]
struct PriceModule {
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<RawNum>,
    #[serde(rename = "regularMarketTime", default)]
    regular_market_time: Option<RawNum>,
    #[serde(default)]
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FinancialDataModule {
    #[serde(rename = "currentPrice", default)]
    current_price: Option<RawNum>,
}

#[derive(Debug, Deserialize)]
struct SummaryDetailModule {
    #[serde(rename = "previousClose", default)]
    previous_close: Option<RawNum>,
}

#[derive(Debug, Deserialize)]
struct KeyStatisticsModule {
    #[serde(rename = "heldPercentInstitutions", default)]
    held_percent_institutions: Option<RawNum>,
    #[serde(rename = "heldPercentInsiders", default)]
    held_percent_insiders: Option<RawNum>,
}

fn parse_snapshot_body(body: &str) -> Result<SnapshotInfo, ProviderError> {
    let response: QuoteSummaryResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::parse(format!("failed to parse yahoo quoteSummary: {e}")))?;
    check_api_error(&response.quote_summary.error, "quoteSummary")?;

    let result = response
        .quote_summary
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::missing_data("quoteSummary returned no result"))?;

    let price = result.price.as_ref();
    Ok(SnapshotInfo {
        current_price: opt_value(result.financial_data.as_ref().and_then(|m| m.current_price)),
        regular_market_price: opt_value(price.and_then(|m| m.regular_market_price)),
        previous_close: opt_value(result.summary_detail.as_ref().and_then(|m| m.previous_close)),
        regular_market_time: opt_value(price.and_then(|m| m.regular_market_time))
            .map(|secs| secs as i64),
        currency: result.price.and_then(|m| m.currency),
        held_percent_institutions: opt_value(
            result
                .default_key_statistics
                .as_ref()
                .and_then(|m| m.held_percent_institutions),
        ),
        held_percent_insiders: opt_value(
            result
                .default_key_statistics
                .as_ref()
                .and_then(|m| m.held_percent_insiders),
        ),
    })
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteResponseData,
}

#[derive(Debug, Deserialize)]
struct QuoteResponseData {
    #[serde(default)]
    result: Vec<QuoteData>,
    #[serde(default)]
    error: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<RawNum>,
}

fn parse_fast_quote_body(body: &str) -> Result<FastQuote, ProviderError> {
    let response: QuoteResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::parse(format!("failed to parse yahoo quote: {e}")))?;
    check_api_error(&response.quote_response.error, "quote")?;

    let quote = response
        .quote_response
        .result
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::missing_data("quote returned no result"))?;

    Ok(FastQuote {
        last_price: opt_value(quote.regular_market_price),
    })
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

fn parse_chart_body(body: &str) -> Result<Vec<CloseBar>, ProviderError> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::parse(format!("failed to parse yahoo chart: {e}")))?;
    check_api_error(&response.chart.error, "chart")?;

    let result = response
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::missing_data("chart returned no result"))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|quote| quote.close)
        .unwrap_or_default();

    // Bars with a null close are gaps; skip them.
    let bars = timestamps
        .into_iter()
        .zip(closes)
        .filter_map(|(ts, close)| close.map(|close| CloseBar { ts, close }))
        .collect();

    Ok(bars)
}

#[derive(Debug, Deserialize)]
struct TimeseriesResponse {
    timeseries: TimeseriesData,
}

#[derive(Debug, Deserialize)]
struct TimeseriesData {
    #[serde(default)]
    result: Option<Vec<TimeseriesResult>>,
    #[serde(default)]
    error: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct TimeseriesResult {
    meta: TimeseriesMeta,
    #[serde(flatten)]
    series: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TimeseriesMeta {
    #[serde(rename = "type", default)]
    series_type: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TimeseriesPoint {
    #[serde(rename = "asOfDate")]
    as_of_date: String,
    #[serde(rename = "reportedValue", default)]
    reported_value: Option<RawNum>,
}

fn line_item_for(series_type: &str) -> Option<&'static str> {
    match series_type {
        "quarterlyTotalRevenue" => Some(TOTAL_REVENUE),
        "quarterlyOperatingRevenue" => Some(OPERATING_REVENUE),
        _ => None,
    }
}

fn parse_iso_date(value: &str) -> Option<Date> {
    let mut parts = value.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u8 = parts.next()?.parse().ok()?;
    let day: u8 = parts.next()?.parse().ok()?;
    Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()
}

fn parse_timeseries_body(body: &str) -> Result<IncomeStatement, ProviderError> {
    let response: TimeseriesResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::parse(format!("failed to parse yahoo timeseries: {e}")))?;
    check_api_error(&response.timeseries.error, "timeseries")?;

    let mut statement = IncomeStatement::default();
    for result in response.timeseries.result.unwrap_or_default() {
        let Some(series_type) = result.meta.series_type.first() else {
            continue;
        };
        let Some(line_item) = line_item_for(series_type) else {
            continue;
        };
        let Some(raw_points) = result.series.get(series_type.as_str()) else {
            continue;
        };

        let points: Vec<Option<TimeseriesPoint>> =
            serde_json::from_value(raw_points.clone()).map_err(|e| {
                ProviderError::parse(format!("failed to parse yahoo timeseries points: {e}"))
            })?;

        let periods: Vec<IncomePeriod> = points
            .into_iter()
            .flatten()
            .filter_map(|point| {
                let period_end = parse_iso_date(&point.as_of_date)?;
                // A period reported without a figure stays NaN; the series
                // builder drops it rather than coercing to zero.
                let value = point
                    .reported_value
                    .and_then(RawNum::value)
                    .unwrap_or(f64::NAN);
                Some(IncomePeriod { period_end, value })
            })
            .collect();

        if !periods.is_empty() {
            statement.insert(line_item, periods);
        }
    }

    if statement.is_empty() {
        return Err(ProviderError::missing_data(
            "timeseries returned no revenue rows",
        ));
    }

    Ok(statement)
}

// ============================================================================
// Mock payloads
// ============================================================================

fn ticker_seed(ticker: &Ticker) -> u64 {
    ticker.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(byte as u64)
    })
}

fn mock_base_price(ticker: &Ticker) -> f64 {
    80.0 + (ticker_seed(ticker) % 600) as f64 / 10.0
}

fn is_taiwan_listed(ticker: &Ticker) -> bool {
    ticker.as_str().to_ascii_uppercase().ends_with(".TW")
}

fn mock_snapshot(ticker: &Ticker) -> SnapshotInfo {
    let base = mock_base_price(ticker);
    let seed = ticker_seed(ticker);
    SnapshotInfo {
        current_price: Some(base),
        regular_market_price: Some(base - 0.2),
        previous_close: Some(base - 1.0),
        regular_market_time: Some(1_700_000_000),
        currency: Some(String::from(if is_taiwan_listed(ticker) {
            "TWD"
        } else {
            "USD"
        })),
        held_percent_institutions: Some((seed % 60) as f64 / 100.0),
        held_percent_insiders: Some((seed % 9) as f64 / 100.0),
    }
}

fn mock_history(ticker: &Ticker, range: HistoryRange, interval: BarInterval) -> Vec<CloseBar> {
    let (count, step) = match (range, interval) {
        (HistoryRange::OneDay, BarInterval::OneMinute) => (30_usize, 60_i64),
        (HistoryRange::OneDay, BarInterval::OneDay) => (1, 86_400),
        // Long enough to exercise chart truncation.
        (HistoryRange::ThreeMonths, _) => (66, 86_400),
    };

    let base = mock_base_price(ticker);
    let seed = ticker_seed(ticker);
    let end = 1_700_000_000_i64;

    (0..count)
        .map(|index| CloseBar {
            ts: end - step * (count - 1 - index) as i64,
            close: base + ((seed + index as u64) % 50) as f64 / 10.0,
        })
        .collect()
}

fn mock_income_statement(ticker: &Ticker) -> IncomeStatement {
    let seed = ticker_seed(ticker);
    let quarter_ends = [
        (2023, Month::December, 31),
        (2024, Month::March, 31),
        (2024, Month::June, 30),
        (2024, Month::September, 30),
    ];

    let periods = quarter_ends
        .iter()
        .enumerate()
        .filter_map(|(index, &(year, month, day))| {
            let period_end = Date::from_calendar_date(year, month, day).ok()?;
            Some(IncomePeriod {
                period_end,
                value: 1.0e9 + (seed % 500) as f64 * 1.0e6 + index as f64 * 2.5e7,
            })
        })
        .collect();

    let mut statement = IncomeStatement::default();
    statement.insert(TOTAL_REVENUE, periods);
    statement
}
