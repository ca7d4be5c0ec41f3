//! Behavior-driven tests for derived metrics and the fundamentals summary

use stockscope_core::{
    compute_technical, render_analysis, summarize_fundamentals, CompanyProfile, Quote, Symbol,
    TrendLabel, UtcDateTime,
};

fn history(closes: impl IntoIterator<Item = f64>) -> Vec<Quote> {
    closes
        .into_iter()
        .enumerate()
        .map(|(day, close)| {
            let ts = UtcDateTime::from_unix_timestamp(1_600_000_000 + day as i64 * 86_400)
                .expect("timestamp");
            Quote::new(ts, close, close, close, close, None).expect("quote")
        })
        .collect()
}

// =============================================================================
// Metrics: Moving Averages
// =============================================================================

#[test]
fn when_history_is_shorter_than_both_windows_system_reports_no_averages() {
    // Given: 49 sessions of history
    let quotes = history((1..=49).map(f64::from));

    // When: Metrics are computed
    let metrics = compute_technical(&quotes).expect("metrics");

    // Then: Neither average exists and the trend is indeterminate
    assert_eq!(metrics.latest_close, 49.0);
    assert_eq!(metrics.sma50, None);
    assert_eq!(metrics.sma200, None);
    assert_eq!(metrics.trend, TrendLabel::Indeterminate);
}

#[test]
fn when_history_covers_only_short_window_system_reports_short_average() {
    // Given: 199 sessions of rising closes
    let quotes = history((1..=199).map(f64::from));

    // When: Metrics are computed
    let metrics = compute_technical(&quotes).expect("metrics");

    // Then: SMA-50 is the mean of closes 150..=199 and SMA-200 is missing
    assert_eq!(metrics.sma50, Some(174.5));
    assert_eq!(metrics.sma200, None);
    assert_eq!(metrics.trend, TrendLabel::Indeterminate);
}

#[test]
fn when_closes_are_flat_system_labels_trend_bearish() {
    // Given: 250 identical closes
    let quotes = history(std::iter::repeat(100.0).take(250));

    // When: Metrics are computed
    let metrics = compute_technical(&quotes).expect("metrics");

    // Then: Equal averages are not a bullish crossover
    assert_eq!(metrics.latest_close, 100.0);
    assert_eq!(metrics.sma50, Some(100.0));
    assert_eq!(metrics.sma200, Some(100.0));
    assert_eq!(metrics.trend, TrendLabel::Bearish);
}

#[test]
fn when_recent_closes_rise_above_long_average_system_labels_trend_bullish() {
    // Given: 200 sessions at 50 followed by 50 sessions at 150
    let closes = std::iter::repeat(50.0)
        .take(200)
        .chain(std::iter::repeat(150.0).take(50));
    let quotes = history(closes);

    // When: Metrics are computed
    let metrics = compute_technical(&quotes).expect("metrics");

    // Then: The short average sits above the long one
    assert_eq!(metrics.sma50, Some(150.0));
    assert_eq!(metrics.sma200, Some(75.0));
    assert_eq!(metrics.trend, TrendLabel::Bullish);
}

// =============================================================================
// Fundamentals: Placeholders and Formatting
// =============================================================================

#[test]
fn when_profile_is_empty_system_uses_placeholders_everywhere() {
    // Given: No company information
    let profile = CompanyProfile::new();

    // When: The fundamentals are summarized
    let summary = summarize_fundamentals(&profile);

    // Then: Every field falls back to its placeholder, in display order
    let rows: Vec<(&str, &str)> = summary.iter().collect();
    assert_eq!(
        rows,
        vec![
            ("Sector", "N/A"),
            ("Industry", "N/A"),
            ("Market Cap", "N/A"),
            ("PE Ratio", "N/A"),
            ("EPS", "N/A"),
            ("Dividend Yield", "0%"),
        ]
    );
}

#[test]
fn when_market_cap_is_present_system_groups_thousands() {
    // Given: A profile with a market cap only
    let profile = CompanyProfile::new().with("marketCap", 2_500_000_000_i64);

    // When: The fundamentals are summarized
    let summary = summarize_fundamentals(&profile);

    // Then: The market cap is dollar-formatted and other fields stay independent
    assert_eq!(summary.get("Market Cap"), Some("$2,500,000,000"));
    assert_eq!(summary.get("Sector"), Some("N/A"));
}

#[test]
fn when_profile_is_complete_system_formats_every_field() {
    // Given: A full provider profile
    let profile = CompanyProfile::new()
        .with("sector", "Technology")
        .with("industry", "Consumer Electronics")
        .with("marketCap", 2_950_000_000_000_i64)
        .with("trailingPE", 29.1)
        .with("trailingEps", 6.43)
        .with("dividendYield", 0.0055);

    // When: The fundamentals are summarized
    let summary = summarize_fundamentals(&profile);

    // Then: Each field is rendered from its source key
    assert_eq!(summary.get("Industry"), Some("Consumer Electronics"));
    assert_eq!(summary.get("Market Cap"), Some("$2,950,000,000,000"));
    assert_eq!(summary.get("PE Ratio"), Some("29.1"));
    assert_eq!(summary.get("EPS"), Some("6.43"));
    assert_eq!(summary.get("Dividend Yield"), Some("0.55%"));
}

// =============================================================================
// Analysis Report
// =============================================================================

#[test]
fn when_trend_is_bearish_report_says_so() {
    // Given: Flat history and a sector
    let quotes = history(std::iter::repeat(100.0).take(250));
    let metrics = compute_technical(&quotes).expect("metrics");
    let profile = CompanyProfile::new().with("sector", "Energy");

    // When: The analysis is rendered
    let report = render_analysis(&Symbol::parse("XOM").expect("symbol"), &metrics, &profile);

    // Then: It carries the prices, the signal and the fundamentals section
    assert!(report.starts_with("Investment Analysis for XOM"));
    assert!(report.contains("Current Price: $100.00"));
    assert!(report.contains("Bearish crossover signal"));
    assert!(report.contains("- Sector: Energy"));
    assert!(report.contains("- P/E Ratio: N/A"));
}
