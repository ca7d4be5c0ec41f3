//! # Domain Models
//!
//! Canonical domain types for stockscope.
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Quote`] | One OHLC observation with timestamp |
//! | [`PriceHistory`] | Non-empty, ascending, de-duplicated quotes |
//! | [`CompanyProfile`] | Sparse provider-defined company metadata |
//! | [`FinancialStatement`] | Income statement table |
//! | [`RecommendationRecord`] | Analyst recommendation trend row |
//! | [`Symbol`] | Validated ticker symbol |
//! | [`Period`] | Lookback period (1d .. 5y) |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! ## Validation
//!
//! Quotes and histories enforce their invariants at construction time:
//!
//! ```rust,ignore
//! use stockscope_core::{PriceHistory, Quote, UtcDateTime, ValidationError};
//!
//! let ts = UtcDateTime::parse("2024-01-02T14:30:00Z")?;
//! let quote = Quote::new(ts, 100.0, 105.0, 95.0, 102.0, Some(1_000))?;
//! let history = PriceHistory::new(vec![quote])?;
//!
//! assert!(matches!(PriceHistory::new(Vec::new()), Err(ValidationError::EmptyHistory)));
//! ```

mod company;
mod models;
mod period;
mod symbol;
mod timestamp;

pub use company::{
    CompanyProfile, FinancialStatement, ProfileValue, RecommendationRecord, StatementRow,
};
pub use models::{PriceHistory, Quote};
pub use period::Period;
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
