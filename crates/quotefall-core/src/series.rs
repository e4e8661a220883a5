//! Auxiliary chart series derived from provider payloads.

use crate::provider::IncomeStatement;
use crate::{CloseBar, HistoryRange, RevenuePoint};

/// Trailing points kept on the close-price chart.
pub const CHART_POINTS: usize = 60;

/// Lookback window fetched for the close-price chart.
pub const CHART_WINDOW: HistoryRange = HistoryRange::ThreeMonths;

/// Income-statement line item preferred for the revenue series.
pub const TOTAL_REVENUE: &str = "Total Revenue";

/// Fallback line item used under some accounting standards.
pub const OPERATING_REVENUE: &str = "Operating Revenue";

/// Trailing closes, most-recent-last, at most [`CHART_POINTS`] long.
/// Short windows pass through unpadded.
pub fn close_series(bars: &[CloseBar]) -> Vec<f64> {
    let skip = bars.len().saturating_sub(CHART_POINTS);
    bars[skip..].iter().map(|bar| bar.close).collect()
}

/// Quarterly revenue points, ascending by period end.
///
/// Prefers the [`TOTAL_REVENUE`] row, falling back to
/// [`OPERATING_REVENUE`]. Periods whose reported value is NaN are dropped,
/// never coerced to zero. A statement with neither row yields an empty
/// series.
pub fn revenue_series(statement: &IncomeStatement) -> Vec<RevenuePoint> {
    let Some(rows) = statement
        .row(TOTAL_REVENUE)
        .or_else(|| statement.row(OPERATING_REVENUE))
    else {
        return Vec::new();
    };

    let mut periods = rows.to_vec();
    periods.sort_by_key(|period| period.period_end);

    periods
        .into_iter()
        .filter(|period| !period.value.is_nan())
        .map(|period| {
            let year = period.period_end.year();
            let month = u8::from(period.period_end.month());
            // Calendar quarter; strftime has no %q.
            let quarter = (month - 1) / 3 + 1;
            RevenuePoint {
                date: format!("{year}-Q{quarter}"),
                date_full: format!("{year:04}-{month:02}"),
                value: period.value,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::IncomePeriod;
    use time::{Date, Month};

    fn bars(n: usize) -> Vec<CloseBar> {
        (0..n)
            .map(|i| CloseBar {
                ts: i as i64 * 86_400,
                close: 100.0 + i as f64,
            })
            .collect()
    }

    fn period(year: i32, month: Month, day: u8, value: f64) -> IncomePeriod {
        IncomePeriod {
            period_end: Date::from_calendar_date(year, month, day).expect("valid date"),
            value,
        }
    }

    #[test]
    fn long_window_is_truncated_to_trailing_points() {
        let window = bars(90);
        let series = close_series(&window);
        assert_eq!(series.len(), CHART_POINTS);
        assert_eq!(series.first().copied(), Some(130.0));
        assert_eq!(series.last().copied(), Some(189.0));
    }

    #[test]
    fn short_window_passes_through_unpadded() {
        assert_eq!(close_series(&bars(7)).len(), 7);
        assert!(close_series(&[]).is_empty());
    }

    #[test]
    fn series_is_always_a_suffix_of_the_window() {
        for n in 0..=90 {
            let window = bars(n);
            let series = close_series(&window);
            assert!(series.len() <= CHART_POINTS);
            let skip = window.len() - series.len();
            let suffix: Vec<f64> = window[skip..].iter().map(|bar| bar.close).collect();
            assert_eq!(series, suffix);
        }
    }

    #[test]
    fn revenue_sorts_ascending_and_labels_quarters() {
        let mut statement = IncomeStatement::default();
        statement.insert(
            TOTAL_REVENUE,
            vec![
                period(2024, Month::December, 31, 4.0),
                period(2024, Month::March, 31, 1.0),
                period(2024, Month::June, 30, 2.0),
                period(2024, Month::September, 30, 3.0),
            ],
        );

        let series = revenue_series(&statement);
        let labels: Vec<&str> = series.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(labels, ["2024-Q1", "2024-Q2", "2024-Q3", "2024-Q4"]);
        assert_eq!(series[0].date_full, "2024-03");
        assert_eq!(series[3].value, 4.0);
    }

    #[test]
    fn nan_periods_are_dropped_not_zeroed() {
        let mut statement = IncomeStatement::default();
        statement.insert(
            TOTAL_REVENUE,
            vec![
                period(2024, Month::March, 31, 1.0),
                period(2024, Month::June, 30, f64::NAN),
                period(2024, Month::September, 30, 3.0),
            ],
        );

        let series = revenue_series(&statement);
        assert_eq!(series.len(), 2);
        assert!(series.iter().all(|p| !p.value.is_nan()));
    }

    #[test]
    fn falls_back_to_operating_revenue_row() {
        let mut statement = IncomeStatement::default();
        statement.insert(
            OPERATING_REVENUE,
            vec![period(2023, Month::December, 31, 9.0)],
        );

        let series = revenue_series(&statement);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].date, "2023-Q4");
    }

    #[test]
    fn missing_revenue_rows_yield_empty_series() {
        let statement = IncomeStatement::default();
        assert!(revenue_series(&statement).is_empty());
    }
}
