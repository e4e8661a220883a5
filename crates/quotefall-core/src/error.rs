use thiserror::Error;

/// Validation errors for caller-supplied input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("ticker contains invalid character '{ch}' at index {index}")]
    TickerInvalidChar { ch: char, index: usize },
}

/// Terminal outcome of a quote resolution request.
///
/// `PriceUnavailable` is the distinct not-found condition: every source in
/// the waterfall came back empty. It is the only price-path failure and the
/// front-end maps it to a 404-style response. Everything else surfaces its
/// message text to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no usable price available from any source")]
    PriceUnavailable,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ResolveError {
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::PriceUnavailable)
    }
}
