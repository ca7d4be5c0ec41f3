//! Retrieval contracts and the structured error they report.
//!
//! Two seams separate the fetcher from the provider:
//!
//! | Trait | Methods | Used for |
//! |-------|---------|----------|
//! | [`HistorySource`] | `history` | One link of the ordered history fallback chain |
//! | [`MetadataSource`] | `profile`, `financials`, `recommendations` | Best-effort auxiliary data |
//!
//! # Example
//!
//! ```rust,ignore
//! use stockscope_core::{HistorySource, Period, SourceError, Symbol, YahooChartSource};
//!
//! async fn latest_close(source: &YahooChartSource) -> Result<Option<f64>, SourceError> {
//!     let symbol = Symbol::parse("AAPL").expect("valid symbol");
//!     let quotes = source.history(&symbol, Period::OneMonth).await?;
//!     Ok(quotes.last().map(|quote| quote.close))
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{CompanyProfile, FinancialStatement, Period, Quote, RecommendationRecord, Symbol};

/// Boxed future returned by source trait methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// The provider does not know the symbol through this interface.
    NotFound,
    Unavailable,
    RateLimited,
    /// The provider answered with a payload that could not be decoded.
    Malformed,
}

/// Structured source error used by the fetcher's fallback decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::NotFound, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unavailable, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::RateLimited, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Malformed, message)
    }

    fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the fetcher may move on to the next strategy.
    pub const fn is_soft_miss(&self) -> bool {
        matches!(self.kind, SourceErrorKind::NotFound)
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Malformed => "source.malformed",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// One way of retrieving quote history.
///
/// An empty `Ok` vector and a `NotFound` error both mean "nothing here";
/// the fetcher then tries the next source in its chain. Any other error is
/// a provider fault.
pub trait HistorySource: Send + Sync {
    /// Stable name used in logs and in `StockData::source`.
    fn name(&self) -> &'static str;

    fn history<'a>(&'a self, symbol: &'a Symbol, period: Period) -> SourceFuture<'a, Vec<Quote>>;
}

/// Auxiliary company data. Every method is independently optional for the
/// fetcher.
pub trait MetadataSource: Send + Sync {
    fn profile<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, CompanyProfile>;

    fn financials<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, FinancialStatement>;

    fn recommendations<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> SourceFuture<'a, Vec<RecommendationRecord>>;
}

/// Metadata source that always returns empty values.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMetadata;

impl MetadataSource for NoMetadata {
    fn profile<'a>(&'a self, _symbol: &'a Symbol) -> SourceFuture<'a, CompanyProfile> {
        Box::pin(async { Ok(CompanyProfile::new()) })
    }

    fn financials<'a>(&'a self, _symbol: &'a Symbol) -> SourceFuture<'a, FinancialStatement> {
        Box::pin(async { Ok(FinancialStatement::empty()) })
    }

    fn recommendations<'a>(
        &'a self,
        _symbol: &'a Symbol,
    ) -> SourceFuture<'a, Vec<RecommendationRecord>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}
