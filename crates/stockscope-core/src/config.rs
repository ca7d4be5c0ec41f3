//! Fetcher configuration and the defaults shared with the CLI.

use std::env;

use time::Duration;

use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::Period;

/// Lifetime of a cached fetch result.
pub const CACHE_TTL_SECS: i64 = 3600;
pub const DEFAULT_SYMBOL: &str = "AAPL";
pub const DEFAULT_PERIOD: Period = Period::OneYear;

pub const CACHE_TTL_ENV: &str = "STOCKSCOPE_CACHE_TTL_SECS";
pub const TIMEOUT_ENV: &str = "STOCKSCOPE_TIMEOUT_MS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetcherConfig {
    pub cache_ttl_secs: i64,
    pub timeout_ms: u64,
}

impl FetcherConfig {
    /// Defaults overridden by `STOCKSCOPE_CACHE_TTL_SECS` and
    /// `STOCKSCOPE_TIMEOUT_MS`. Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(CACHE_TTL_ENV) {
            match raw.trim().parse::<i64>() {
                Ok(secs) if secs >= 0 => config.cache_ttl_secs = secs,
                _ => {
                    tracing::warn!(var = CACHE_TTL_ENV, value = %raw, "ignoring invalid cache TTL")
                }
            }
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.timeout_ms = ms,
                _ => tracing::warn!(var = TIMEOUT_ENV, value = %raw, "ignoring invalid timeout"),
            }
        }

        config
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::seconds(self.cache_ttl_secs)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: CACHE_TTL_SECS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = FetcherConfig::default();
        assert_eq!(config.cache_ttl(), Duration::hours(1));
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(DEFAULT_PERIOD.as_str(), "1y");
    }

    #[test]
    fn lookup_overrides_valid_values_only() {
        let config = FetcherConfig::from_lookup(|name| match name {
            CACHE_TTL_ENV => Some(String::from("120")),
            TIMEOUT_ENV => Some(String::from("fast")),
            _ => None,
        });

        assert_eq!(config.cache_ttl_secs, 120);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }
}
