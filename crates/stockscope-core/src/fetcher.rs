//! History and metadata retrieval with a strategy chain and a TTL cache.
//!
//! ```text
//! fetch(symbol, period)
//!   ├─ cache hit ──────────────────────────────▶ Ok(cached)
//!   └─ miss
//!       ├─ chart source    ── empty / NotFound / fault ─┐
//!       ├─ download source ── empty / NotFound / fault ─┤
//!       │     any NotFound, or nothing but empties ─────┴▶ Err(NoData)
//!       │     otherwise the first fault ─────────────────▶ Err(Provider)
//!       └─ first non-empty history
//!           ├─ profile / financials / recommendations (best effort)
//!           └─ cache put ──────────────────────▶ Ok(data)
//! ```

use std::sync::Arc;

use serde::Serialize;
use time::Duration;

use crate::adapters::{yahoo_sources, YahooClient};
use crate::cache::{CacheMode, CacheStore};
use crate::clock::{Clock, SystemClock};
use crate::config::FetcherConfig;
use crate::data_source::{HistorySource, MetadataSource, SourceFuture};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::{
    CompanyProfile, FetchError, FinancialStatement, Period, PriceHistory, RecommendationRecord,
    Symbol,
};

/// Successful fetch payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockData {
    pub symbol: Symbol,
    pub period: Period,
    pub history: PriceHistory,
    pub profile: CompanyProfile,
    pub financials: FinancialStatement,
    pub recommendations: Vec<RecommendationRecord>,
    /// Name of the history source that produced `history`.
    pub source: &'static str,
}

pub type FetchResult = Result<StockData, FetchError>;

type CacheKey = (Symbol, Period);

/// Fetches stock data through an ordered chain of history sources, caching
/// successful results per (symbol, period).
///
/// Calls are sequential and the cache is mutated through `&mut self`; share
/// a fetcher across tasks only behind external synchronization.
pub struct DataFetcher {
    chain: Vec<Arc<dyn HistorySource>>,
    metadata: Arc<dyn MetadataSource>,
    cache: CacheStore<CacheKey, StockData>,
    ttl: Duration,
    mode: CacheMode,
}

impl DataFetcher {
    pub fn new(
        chain: Vec<Arc<dyn HistorySource>>,
        metadata: Arc<dyn MetadataSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            chain,
            metadata,
            cache: CacheStore::new(clock),
            ttl: FetcherConfig::default().cache_ttl(),
            mode: CacheMode::default(),
        }
    }

    /// Yahoo chain over the real network.
    pub fn yahoo(config: FetcherConfig) -> Self {
        Self::yahoo_with_http_client(
            Arc::new(ReqwestHttpClient::new()),
            Arc::new(SystemClock),
            config,
        )
    }

    /// Yahoo chain over an arbitrary transport.
    pub fn yahoo_with_http_client(
        http_client: Arc<dyn HttpClient>,
        clock: Arc<dyn Clock>,
        config: FetcherConfig,
    ) -> Self {
        let client = Arc::new(YahooClient::new(http_client).with_timeout_ms(config.timeout_ms));
        let (chain, metadata) = yahoo_sources(client, Arc::clone(&clock));
        Self::new(chain, metadata, clock).with_cache_ttl(config.cache_ttl())
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_cache_mode(mut self, mode: CacheMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn set_cache_mode(&mut self, mode: CacheMode) {
        self.mode = mode;
    }

    /// Entries currently held, including expired ones not yet purged.
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Returns stock data for `symbol` over `period`.
    ///
    /// Never panics and never lets a provider error escape: every failure is
    /// folded into [`FetchError`].
    pub async fn fetch(&mut self, symbol: &Symbol, period: Period) -> FetchResult {
        let key = (symbol.clone(), period);

        if self.mode.reads() {
            if let Some(hit) = self.cache.get(&key) {
                tracing::debug!(%symbol, %period, "cache hit");
                return Ok(hit);
            }
            tracing::debug!(%symbol, %period, "cache miss");
        }

        let (history, source) = self.fetch_history(symbol, period).await?;

        let profile = best_effort("profile", symbol, self.metadata.profile(symbol)).await;
        let financials =
            best_effort("financials", symbol, self.metadata.financials(symbol)).await;
        let recommendations = best_effort(
            "recommendations",
            symbol,
            self.metadata.recommendations(symbol),
        )
        .await;

        let data = StockData {
            symbol: symbol.clone(),
            period,
            history,
            profile,
            financials,
            recommendations,
            source,
        };

        if self.mode.writes() {
            self.cache.clear_expired();
            let expires_at = self.cache.expiry_after(self.ttl);
            self.cache.put(key, data.clone(), expires_at);
        }

        Ok(data)
    }

    async fn fetch_history(
        &self,
        symbol: &Symbol,
        period: Period,
    ) -> Result<(PriceHistory, &'static str), FetchError> {
        let mut first_fault: Option<String> = None;
        let mut not_found = false;

        for source in &self.chain {
            let name = source.name();
            match source.history(symbol, period).await {
                Ok(quotes) if quotes.is_empty() => {
                    tracing::info!(source = name, %symbol, %period, "no history, trying next");
                }
                Ok(quotes) => match PriceHistory::new(quotes) {
                    Ok(history) => {
                        tracing::debug!(
                            source = name,
                            %symbol,
                            %period,
                            quotes = history.len(),
                            "history fetched"
                        );
                        return Ok((history, name));
                    }
                    Err(error) => {
                        tracing::warn!(
                            source = name,
                            %symbol,
                            %error,
                            "unusable history, trying next"
                        );
                        first_fault.get_or_insert_with(|| error.to_string());
                    }
                },
                Err(error) if error.is_soft_miss() => {
                    tracing::info!(
                        source = name,
                        %symbol,
                        %period,
                        %error,
                        "symbol unknown, trying next"
                    );
                    not_found = true;
                }
                Err(error) => {
                    tracing::warn!(
                        source = name,
                        %symbol,
                        %period,
                        %error,
                        "provider fault, trying next"
                    );
                    first_fault.get_or_insert_with(|| error.message().to_owned());
                }
            }
        }

        // A source that positively does not know the symbol outranks faults
        // from the others.
        match first_fault {
            Some(message) if !not_found => Err(FetchError::Provider(message)),
            _ => Err(FetchError::NoData {
                symbol: symbol.to_string(),
            }),
        }
    }
}

async fn best_effort<T: Default>(
    what: &'static str,
    symbol: &Symbol,
    future: SourceFuture<'_, T>,
) -> T {
    match future.await {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(%symbol, %error, "{what} unavailable, continuing without it");
            T::default()
        }
    }
}
