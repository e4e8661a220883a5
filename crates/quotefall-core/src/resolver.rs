//! Price-resolution waterfall.
//!
//! Four candidate sources are tried in fixed priority order, stopping at
//! the first usable price: snapshot info, fast quote, intraday history,
//! daily history. The steps run strictly sequentially; a failed or empty
//! step is recorded as a note and the next one runs. There is no retry and
//! no speculative parallel fetch.

use crate::config::TimeZonePolicy;
use crate::provider::QuoteProvider;
use crate::{BarInterval, HistoryRange, PriceObservation, PriceSource, Ticker};

/// A price of exactly zero is treated as missing and the waterfall
/// continues. This mirrors the upstream feed's falsy-check semantics and is
/// preserved deliberately: a legitimately zero price is indistinguishable
/// from an absent one and will fall through to the next source. Accepted
/// upstream limitation, not a bug to fix silently.
pub const ZERO_PRICE_IS_MISSING: bool = true;

/// Filter a candidate price down to a usable one.
pub(crate) fn usable_price(candidate: Option<f64>) -> Option<f64> {
    candidate
        .filter(|price| price.is_finite())
        .filter(|price| !(ZERO_PRICE_IS_MISSING && *price == 0.0))
}

/// Per-deployment knobs consulted by the waterfall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvePolicy {
    /// Whether the snapshot step falls through to the previous close after
    /// the current and regular-market prices.
    pub snapshot_previous_close: bool,
    /// Zone used to render observation timestamps.
    pub time_zone: TimeZonePolicy,
}

/// Waterfall outcome: the winning observation, if any, plus one note per
/// source that failed or came back empty along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub observation: Option<PriceObservation>,
    pub notes: Vec<String>,
}

/// Run the waterfall for one ticker.
pub async fn resolve_price(
    provider: &dyn QuoteProvider,
    ticker: &Ticker,
    policy: &ResolvePolicy,
) -> Resolution {
    let mut notes = Vec::new();

    // Step 1: snapshot info, often the freshest payload.
    match provider.snapshot_info(ticker.clone()).await {
        Ok(info) => {
            let mut candidate = usable_price(info.current_price);
            if candidate.is_none() {
                candidate = usable_price(info.regular_market_price);
            }
            if candidate.is_none() && policy.snapshot_previous_close {
                candidate = usable_price(info.previous_close);
            }

            if let Some(price) = candidate {
                let observed_at = info
                    .regular_market_time
                    .and_then(|secs| policy.time_zone.format_unix(secs));
                return Resolution {
                    observation: Some(PriceObservation {
                        price,
                        observed_at,
                        source: PriceSource::Snapshot,
                    }),
                    notes,
                };
            }
            notes.push(String::from("snapshot info carried no usable price"));
        }
        Err(error) => notes.push(format!("snapshot info unavailable: {error}")),
    }

    // Step 2: lightweight last-price quote. No timestamp guarantee.
    match provider.fast_quote(ticker.clone()).await {
        Ok(quote) => {
            if let Some(price) = usable_price(quote.last_price) {
                return Resolution {
                    observation: Some(PriceObservation {
                        price,
                        observed_at: None,
                        source: PriceSource::FastQuote,
                    }),
                    notes,
                };
            }
            notes.push(String::from("fast quote carried no usable price"));
        }
        Err(error) => notes.push(format!("fast quote unavailable: {error}")),
    }

    // Step 3: close of the last 1-minute bar. The bar timestamp is rendered
    // the same way whether or not the source carried zone information.
    match provider
        .history(ticker.clone(), HistoryRange::OneDay, BarInterval::OneMinute)
        .await
    {
        Ok(bars) => {
            if let Some(bar) = bars.last() {
                if let Some(price) = usable_price(Some(bar.close)) {
                    return Resolution {
                        observation: Some(PriceObservation {
                            price,
                            observed_at: policy.time_zone.format_unix(bar.ts),
                            source: PriceSource::IntradayHistory,
                        }),
                        notes,
                    };
                }
            }
            notes.push(String::from("intraday history carried no usable close"));
        }
        Err(error) => notes.push(format!("intraday history unavailable: {error}")),
    }

    // Step 4: last daily close. No intraday timestamp.
    match provider
        .history(ticker.clone(), HistoryRange::OneDay, BarInterval::OneDay)
        .await
    {
        Ok(bars) => {
            if let Some(bar) = bars.last() {
                if let Some(price) = usable_price(Some(bar.close)) {
                    return Resolution {
                        observation: Some(PriceObservation {
                            price,
                            observed_at: None,
                            source: PriceSource::DailyHistory,
                        }),
                        notes,
                    };
                }
            }
            notes.push(String::from("daily history carried no usable close"));
        }
        Err(error) => notes.push(format!("daily history unavailable: {error}")),
    }

    Resolution {
        observation: None,
        notes,
    }
}
