//! Plain-text investment analysis.

use std::fmt::Write;

use crate::metrics::{summarize_fundamentals, DerivedMetrics, TrendLabel, NOT_AVAILABLE};
use crate::{CompanyProfile, Symbol};

pub const DISCLAIMER: &str =
    "Always consult with a financial advisor before making investment decisions.";

/// Renders the analysis block: prices, crossover outlook, a short
/// fundamentals section (omitted for an empty profile) and the disclaimer.
pub fn render_analysis(
    symbol: &Symbol,
    metrics: &DerivedMetrics,
    profile: &CompanyProfile,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Investment Analysis for {symbol}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Current Price: ${:.2}", metrics.latest_close);
    let _ = writeln!(out, "50-Day SMA: {}", money(metrics.sma50));
    let _ = writeln!(out, "200-Day SMA: {}", money(metrics.sma200));
    let _ = writeln!(out);
    let _ = writeln!(out, "Technical Outlook:");
    let _ = writeln!(out, "{}", outlook(metrics.trend));

    if !profile.is_empty() {
        let summary = summarize_fundamentals(profile);
        let text = |key: &str| {
            profile
                .get(key)
                .map(ToString::to_string)
                .unwrap_or_else(|| NOT_AVAILABLE.to_owned())
        };

        let _ = writeln!(out);
        let _ = writeln!(out, "Fundamental Analysis:");
        let _ = writeln!(out, "- Sector: {}", text("sector"));
        let market_cap = summary.get("Market Cap").unwrap_or(NOT_AVAILABLE);
        let _ = writeln!(out, "- Market Cap: {market_cap}");
        let _ = writeln!(out, "- P/E Ratio: {}", text("trailingPE"));
        let _ = writeln!(out, "- ROE: {}", text("returnOnEquity"));
    }

    let _ = writeln!(out);
    let _ = write!(out, "Recommendation: {DISCLAIMER}");

    out
}

fn money(value: Option<f64>) -> String {
    value
        .map(|value| format!("${value:.2}"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_owned())
}

fn outlook(trend: TrendLabel) -> &'static str {
    match trend {
        TrendLabel::Bullish => "Bullish crossover signal",
        TrendLabel::Bearish => "Bearish crossover signal",
        TrendLabel::Indeterminate => "Insufficient history for a crossover signal",
    }
}
