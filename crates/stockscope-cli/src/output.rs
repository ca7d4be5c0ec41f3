use std::io::Write;

use serde::Serialize;
use stockscope_core::metrics::group_thousands;
use stockscope_core::{
    compute_technical, render_analysis, summarize_fundamentals, CompanyProfile, DerivedMetrics,
    FinancialStatement, FundamentalsSummary, Period, PriceHistory, RecommendationRecord,
    StockData, Symbol,
};

use crate::cli::{OutputFormat, View};
use crate::error::CliError;

/// Number of analyst recommendation rows shown in text output.
const RECOMMENDATION_ROWS: usize = 10;

/// Everything the presentation layer shows for one fetch.
#[derive(Debug, Serialize)]
pub struct Analysis<'a> {
    pub symbol: &'a Symbol,
    pub period: Period,
    pub source: &'static str,
    pub metrics: DerivedMetrics,
    pub fundamentals: FundamentalsSummary,
    pub history_len: usize,
    pub financials: &'a FinancialStatement,
    pub recommendations: &'a [RecommendationRecord],
    pub analysis: String,
    #[serde(skip)]
    history: &'a PriceHistory,
    #[serde(skip)]
    profile: &'a CompanyProfile,
}

impl<'a> Analysis<'a> {
    pub fn build(data: &'a StockData) -> Result<Self, CliError> {
        let metrics = compute_technical(&data.history)?;
        Ok(Self {
            symbol: &data.symbol,
            period: data.period,
            source: data.source,
            fundamentals: summarize_fundamentals(&data.profile),
            history_len: data.history.len(),
            financials: &data.financials,
            recommendations: &data.recommendations,
            analysis: render_analysis(&data.symbol, &metrics, &data.profile),
            metrics,
            history: &data.history,
            profile: &data.profile,
        })
    }
}

pub fn render(
    analysis: &Analysis<'_>,
    view: View,
    format: OutputFormat,
    pretty: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(analysis)?
            } else {
                serde_json::to_string(analysis)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Text => render_text(analysis, view, out)?,
    }

    Ok(())
}

fn render_text(analysis: &Analysis<'_>, view: View, out: &mut impl Write) -> std::io::Result<()> {
    match view {
        View::Technical => render_price_summary(analysis, out),
        View::Fundamental => render_fundamentals(analysis, out),
        View::Full => {
            render_price_summary(analysis, out)?;
            writeln!(out)?;
            render_fundamentals(analysis, out)?;
            writeln!(out)?;
            writeln!(out, "{}", analysis.analysis)
        }
    }
}

fn render_price_summary(analysis: &Analysis<'_>, out: &mut impl Write) -> std::io::Result<()> {
    let first = analysis.history.quotes()[0].ts.date();
    let last = analysis.history.latest().ts.date();
    let metrics = &analysis.metrics;

    writeln!(
        out,
        "{} ({}, {} sessions from {first} to {last}, source: {})",
        analysis.symbol, analysis.period, analysis.history_len, analysis.source
    )?;
    writeln!(out, "Latest Close : ${:.2}", metrics.latest_close)?;
    writeln!(out, "50-Day SMA   : {}", money(metrics.sma50))?;
    writeln!(out, "200-Day SMA  : {}", money(metrics.sma200))?;
    writeln!(out, "Trend        : {}", metrics.trend)
}

fn render_fundamentals(analysis: &Analysis<'_>, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "Company Overview")?;
    if analysis.profile.is_empty() {
        writeln!(out, "  No company information available")?;
    } else {
        if let Some(name) = analysis.profile.get_text("longName") {
            writeln!(out, "  {:<15}: {name}", "Name")?;
        }
        for (label, value) in analysis.fundamentals.iter() {
            writeln!(out, "  {label:<15}: {value}")?;
        }
    }

    if !analysis.financials.is_empty() {
        writeln!(out)?;
        render_financials(analysis.financials, out)?;
    }

    if !analysis.recommendations.is_empty() {
        writeln!(out)?;
        render_recommendations(analysis.recommendations, out)?;
    }

    Ok(())
}

fn render_financials(statement: &FinancialStatement, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "Income Statement")?;
    write!(out, "  {:<32}", "")?;
    for column in &statement.columns {
        write!(out, "{column:>20}")?;
    }
    writeln!(out)?;

    for row in &statement.rows {
        write!(out, "  {:<32}", row.label)?;
        for value in &row.values {
            let cell = value
                .map(|value| group_thousands(value.round() as i128))
                .unwrap_or_else(|| String::from("-"));
            write!(out, "{cell:>20}")?;
        }
        writeln!(out)?;
    }

    Ok(())
}

fn render_recommendations(
    records: &[RecommendationRecord],
    out: &mut impl Write,
) -> std::io::Result<()> {
    writeln!(out, "Analyst Recommendations")?;
    writeln!(
        out,
        "  {:<8}{:>11}{:>6}{:>6}{:>6}{:>12}",
        "Period", "Strong Buy", "Buy", "Hold", "Sell", "Strong Sell"
    )?;

    let start = records.len().saturating_sub(RECOMMENDATION_ROWS);
    for record in &records[start..] {
        writeln!(
            out,
            "  {:<8}{:>11}{:>6}{:>6}{:>6}{:>12}",
            record.period,
            record.strong_buy,
            record.buy,
            record.hold,
            record.sell,
            record.strong_sell
        )?;
    }

    Ok(())
}

fn money(value: Option<f64>) -> String {
    value
        .map(|value| format!("${value:.2}"))
        .unwrap_or_else(|| String::from("N/A"))
}
