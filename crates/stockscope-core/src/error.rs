use thiserror::Error;

/// Validation and contract errors exposed by `stockscope-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid period '{value}', expected one of 1d, 5d, 1mo, 3mo, 6mo, 1y, 5y")]
    InvalidPeriod { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("bar high must be >= low")]
    InvalidBarRange,
    #[error("bar open/close must be within high/low range")]
    InvalidBarBounds,

    #[error("price history must contain at least one quote")]
    EmptyHistory,
}

/// Failure of a metrics computation; always a caller bug.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MetricsError {
    #[error("metrics require at least one quote")]
    InsufficientData,
}

/// The `ok: false` side of a fetch. `Display` is the user-facing message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No retrieval strategy produced any quotes.
    #[error("No data found for {symbol}")]
    NoData { symbol: String },

    /// The provider faulted while fetching.
    #[error("API Error: {0}")]
    Provider(String),
}

impl FetchError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NoData { .. } => "fetch.no_data",
            Self::Provider(_) => "fetch.provider_fault",
        }
    }
}
