use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::{UtcDateTime, ValidationError};

/// One OHLC observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub ts: UtcDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

impl Quote {
    pub fn new(
        ts: UtcDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Option<u64>,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;

        if high < low {
            return Err(ValidationError::InvalidBarRange);
        }

        if open < low || open > high || close < low || close > high {
            return Err(ValidationError::InvalidBarBounds);
        }

        Ok(Self {
            ts,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}

/// Quotes ordered by ascending timestamp, without duplicates, never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceHistory(Vec<Quote>);

impl PriceHistory {
    /// Sorts by timestamp; when two quotes share a timestamp the later one in
    /// the input wins.
    pub fn new(mut quotes: Vec<Quote>) -> Result<Self, ValidationError> {
        if quotes.is_empty() {
            return Err(ValidationError::EmptyHistory);
        }

        quotes.reverse();
        quotes.sort_by_key(|quote| quote.ts);
        quotes.dedup_by_key(|quote| quote.ts);

        Ok(Self(quotes))
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.0
    }

    pub fn latest(&self) -> &Quote {
        // Non-empty by construction.
        &self.0[self.0.len() - 1]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.0.iter().map(|quote| quote.close).collect()
    }
}

impl Deref for PriceHistory {
    type Target = [Quote];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de> Deserialize<'de> for PriceHistory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let quotes = Vec::<Quote>::deserialize(deserializer)?;
        Self::new(quotes).map_err(serde::de::Error::custom)
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
