//! Ownership and order-flow enrichment.

use std::ops::RangeInclusive;

use crate::provider::SnapshotInfo;
use crate::{Holdings, SimulatedFlow};

/// Number of points in a simulated flow series.
pub const SIMULATED_FLOW_LEN: usize = 10;

/// Per-channel uniform draw bounds, net shares per day.
pub const FOREIGN_FLOW_RANGE: RangeInclusive<i64> = -1000..=1000;
pub const TRUST_FLOW_RANGE: RangeInclusive<i64> = -500..=500;
pub const DEALER_FLOW_RANGE: RangeInclusive<i64> = -200..=200;

/// Ownership percentages from a snapshot payload. Each field defaults to
/// 0.0 independently when the payload lacks it.
pub fn holdings_from_snapshot(info: &SnapshotInfo) -> Holdings {
    Holdings {
        institutions: info.held_percent_institutions.unwrap_or(0.0),
        insiders: info.held_percent_insiders.unwrap_or(0.0),
    }
}

/// Synthesize a daily order-flow series.
///
/// `days` is accepted for interface compatibility but the output length is
/// always [`SIMULATED_FLOW_LEN`]: the historical contract fixed the series
/// at ten points regardless of the requested span, and consumers depend on
/// that. Draws are independent and uniform within each channel's range.
pub fn simulated_flow(days: usize) -> SimulatedFlow {
    let _ = days;
    SimulatedFlow::new(
        draw_channel(FOREIGN_FLOW_RANGE),
        draw_channel(TRUST_FLOW_RANGE),
        draw_channel(DEALER_FLOW_RANGE),
    )
}

fn draw_channel(range: RangeInclusive<i64>) -> Vec<i64> {
    (0..SIMULATED_FLOW_LEN)
        .map(|_| fastrand::i64(range.clone()))
        .collect()
}
