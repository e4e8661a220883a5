//! Deployment configuration.
//!
//! The two historical deployments of this service diverge in two places:
//! which enrichment fields they emit (real financials vs a simulated chip
//! series) and which zone their timestamps are rendered in (a fixed UTC+8
//! offset vs server-local time). Both axes are explicit configuration
//! rather than compile-time choices.

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

/// Which enrichment field set a deployment emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentVariant {
    /// Quarterly revenue plus institutional/insider holdings.
    RealFinancials,
    /// Synthesized foreign/trust/dealer order-flow series.
    SimulatedChip,
}

impl DeploymentVariant {
    /// The simplified deployment lets the snapshot step fall through one
    /// extra field, to the previous close.
    pub const fn snapshot_uses_previous_close(self) -> bool {
        matches!(self, Self::SimulatedChip)
    }
}

/// Zone applied when rendering timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeZonePolicy {
    /// Fixed offset from UTC, in whole hours.
    FixedOffset(i8),
    /// Server-local time; falls back to UTC when the local offset cannot
    /// be determined.
    Local,
}

impl Default for TimeZonePolicy {
    fn default() -> Self {
        Self::FixedOffset(8)
    }
}

impl TimeZonePolicy {
    fn offset(self) -> UtcOffset {
        match self {
            Self::FixedOffset(hours) => {
                UtcOffset::from_hms(hours, 0, 0).unwrap_or(UtcOffset::UTC)
            }
            Self::Local => UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        }
    }

    /// Current wall-clock time rendered under this policy.
    pub fn now_stamp(self) -> String {
        format_stamp(OffsetDateTime::now_utc().to_offset(self.offset()))
    }

    /// Render a unix timestamp under this policy. Returns `None` for
    /// timestamps outside the representable range.
    pub fn format_unix(self, secs: i64) -> Option<String> {
        OffsetDateTime::from_unix_timestamp(secs)
            .ok()
            .map(|dt| format_stamp(dt.to_offset(self.offset())))
    }
}

/// `YYYY/MM/DD HH:MM:SS`, matching the upstream report format.
pub fn format_stamp(dt: OffsetDateTime) -> String {
    format!(
        "{:04}/{:02}/{:02} {:02}:{:02}:{:02}",
        dt.year(),
        u8::from(dt.month()),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second()
    )
}

/// Per-deployment service configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub variant: DeploymentVariant,
    pub time_zone: TimeZonePolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            variant: DeploymentVariant::RealFinancials,
            time_zone: TimeZonePolicy::FixedOffset(8),
        }
    }
}

impl ServiceConfig {
    /// Configuration matching the simplified deployment: simulated chip
    /// series, server-local timestamps.
    pub fn simulated() -> Self {
        Self {
            variant: DeploymentVariant::SimulatedChip,
            time_zone: TimeZonePolicy::Local,
        }
    }
}
