mod price;
mod report;
mod ticker;

pub use price::{BarInterval, CloseBar, HistoryRange, PriceObservation, PriceSource};
pub use report::{Holdings, QuoteReport, RevenuePoint, SimulatedFlow};
pub use ticker::{Ticker, TAIWAN_SUFFIX};
