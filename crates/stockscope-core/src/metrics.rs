//! Derived technical indicators and the fundamentals projection.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::{CompanyProfile, MetricsError, Quote};

pub const SHORT_WINDOW: usize = 50;
pub const LONG_WINDOW: usize = 200;

/// Placeholder for a missing fundamentals field.
pub const NOT_AVAILABLE: &str = "N/A";

/// Direction implied by the 50/200-day SMA crossover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    Bullish,
    Bearish,
    /// At least one average is missing.
    Indeterminate,
}

impl TrendLabel {
    pub fn from_averages(short: Option<f64>, long: Option<f64>) -> Self {
        match (short, long) {
            (Some(short), Some(long)) if short > long => Self::Bullish,
            (Some(_), Some(_)) => Self::Bearish,
            _ => Self::Indeterminate,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "Bullish",
            Self::Bearish => "Bearish",
            Self::Indeterminate => "Indeterminate",
        }
    }
}

impl Display for TrendLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Indicators derived from one history. Computed per request, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub latest_close: f64,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub trend: TrendLabel,
}

/// Mean of the trailing `window` values, or `None` when there are fewer
/// values than the window (or the window is zero).
pub fn sma(closes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || closes.len() < window {
        return None;
    }
    let tail = &closes[closes.len() - window..];
    Some(tail.iter().sum::<f64>() / window as f64)
}

pub fn compute_technical(history: &[Quote]) -> Result<DerivedMetrics, MetricsError> {
    let latest = history.last().ok_or(MetricsError::InsufficientData)?;
    let closes: Vec<f64> = history.iter().map(|quote| quote.close).collect();

    let sma50 = sma(&closes, SHORT_WINDOW);
    let sma200 = sma(&closes, LONG_WINDOW);

    Ok(DerivedMetrics {
        latest_close: latest.close,
        sma50,
        sma200,
        trend: TrendLabel::from_averages(sma50, sma200),
    })
}

/// One display row of the fundamentals table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FundamentalEntry {
    pub label: &'static str,
    pub value: String,
}

/// Fixed-order display rows: Sector, Industry, Market Cap, PE Ratio, EPS,
/// Dividend Yield.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FundamentalsSummary(Vec<FundamentalEntry>);

impl FundamentalsSummary {
    pub fn entries(&self) -> &[FundamentalEntry] {
        &self.0
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|entry| (entry.label, entry.value.as_str()))
    }
}

/// Projects the profile onto display strings. Each field degrades to its
/// placeholder on its own.
pub fn summarize_fundamentals(profile: &CompanyProfile) -> FundamentalsSummary {
    let text = |key: &str| {
        profile
            .get(key)
            .map(ToString::to_string)
            .unwrap_or_else(|| NOT_AVAILABLE.to_owned())
    };

    let market_cap = profile
        .get_number("marketCap")
        .filter(|value| *value != 0.0)
        .map(|value| format!("${}", group_thousands(value.round() as i128)))
        .unwrap_or_else(|| NOT_AVAILABLE.to_owned());

    let dividend_yield = profile
        .get_number("dividendYield")
        .filter(|value| *value != 0.0)
        .map(|value| format!("{:.2}%", value * 100.0))
        .unwrap_or_else(|| String::from("0%"));

    let entries = [
        ("Sector", text("sector")),
        ("Industry", text("industry")),
        ("Market Cap", market_cap),
        ("PE Ratio", text("trailingPE")),
        ("EPS", text("trailingEps")),
        ("Dividend Yield", dividend_yield),
    ];

    FundamentalsSummary(
        entries
            .into_iter()
            .map(|(label, value)| FundamentalEntry { label, value })
            .collect(),
    )
}

/// `2500000000` → `2,500,000,000`.
pub fn group_thousands(value: i128) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
