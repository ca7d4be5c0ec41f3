//! # Stockscope Core
//!
//! Stock history fetching, caching and derived metrics for the stockscope
//! analysis tool.
//!
//! ## Overview
//!
//! - **Domain models** for quotes, price histories and company metadata
//! - **Yahoo Finance adapters** for ranged chart, bounded download and quoteSummary
//! - **DataFetcher** with an ordered source chain and a one-hour TTL cache
//! - **Metrics** (SMA-50, SMA-200, crossover trend) and a fundamentals summary
//! - **Analysis report** rendered as plain text
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo Finance history and metadata sources |
//! | [`cache`] | Time-bounded in-memory cache |
//! | [`clock`] | Injectable time source |
//! | [`config`] | Fetcher configuration and defaults |
//! | [`data_source`] | Source traits and structured source errors |
//! | [`domain`] | Domain models (Quote, PriceHistory, CompanyProfile, Symbol, Period) |
//! | [`error`] | Core error types |
//! | [`fetcher`] | DataFetcher and its result types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`metrics`] | Technical indicators and fundamentals projection |
//! | [`report`] | Textual investment analysis |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stockscope_core::{compute_technical, DataFetcher, FetcherConfig, Period, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut fetcher = DataFetcher::yahoo(FetcherConfig::from_env());
//!     let symbol = Symbol::parse("AAPL")?;
//!
//!     let data = fetcher.fetch(&symbol, Period::OneYear).await?;
//!     let metrics = compute_technical(&data.history)?;
//!
//!     println!("{symbol}: {} ({})", metrics.latest_close, metrics.trend);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / User     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  DataFetcher    │────▶│ CacheStore+Clock │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ History/Metadata│────▶│ HTTP Client      │
//! │ Sources (Yahoo) │     │ (reqwest)        │
//! └─────────────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Metrics/Report  │
//! └─────────────────┘
//! ```

pub mod adapters;
pub mod cache;
pub mod clock;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod metrics;
pub mod report;

// Adapter implementations
pub use adapters::{
    yahoo_sources, YahooChartSource, YahooClient, YahooDownloadSource, YahooMetadataSource,
};

// Caching
pub use cache::{CacheMode, CacheStore};
pub use clock::{Clock, ManualClock, SystemClock};

// Configuration
pub use config::{FetcherConfig, CACHE_TTL_SECS, DEFAULT_PERIOD, DEFAULT_SYMBOL};

// Source traits and types
pub use data_source::{
    HistorySource, MetadataSource, NoMetadata, SourceError, SourceErrorKind, SourceFuture,
};

// Domain models
pub use domain::{
    CompanyProfile, FinancialStatement, Period, PriceHistory, ProfileValue, Quote,
    RecommendationRecord, StatementRow, Symbol, UtcDateTime,
};

// Error types
pub use error::{FetchError, MetricsError, ValidationError};

// Fetcher
pub use fetcher::{DataFetcher, FetchResult, StockData};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Metrics and report
pub use metrics::{
    compute_technical, sma, summarize_fundamentals, DerivedMetrics, FundamentalEntry,
    FundamentalsSummary, TrendLabel,
};
pub use report::render_analysis;
