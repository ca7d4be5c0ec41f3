//! SVG candlestick chart.

use std::fs;
use std::path::Path;

use stockscope_core::{Quote, Symbol};

const CHART_WIDTH: f64 = 900.0;
const CHART_HEIGHT: f64 = 450.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 40.0;
const MARGIN_LEFT: f64 = 70.0;

const UP_COLOR: &str = "#16a34a";
const DOWN_COLOR: &str = "#dc2626";

pub fn write_svg(path: &Path, symbol: &Symbol, quotes: &[Quote]) -> std::io::Result<()> {
    fs::write(path, candlestick_svg(symbol, quotes))?;
    tracing::debug!(path = %path.display(), candles = quotes.len(), "chart written");
    Ok(())
}

/// Candlestick chart titled `<SYMBOL> Stock Price`: dates along x, price
/// along y, green candles for up sessions and red for down sessions.
pub fn candlestick_svg(symbol: &Symbol, quotes: &[Quote]) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        r##"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"##,
        CHART_WIDTH, CHART_HEIGHT, CHART_WIDTH, CHART_HEIGHT
    ));
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"24\" text-anchor=\"middle\" font-size=\"16\" fill=\"#111\">{} Stock Price</text>\n",
        CHART_WIDTH / 2.0,
        symbol
    ));

    let (Some(first), Some(last)) = (quotes.first(), quotes.last()) else {
        svg.push_str("</svg>\n");
        return svg;
    };

    let min_price = quotes.iter().map(|q| q.low).fold(f64::INFINITY, f64::min);
    let max_price = quotes
        .iter()
        .map(|q| q.high)
        .fold(f64::NEG_INFINITY, f64::max);
    let range = (max_price - min_price).max(0.01);

    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let slot = plot_width / quotes.len() as f64;
    let body_width = (slot * 0.7).max(1.0);

    let x_center = |i: usize| -> f64 { MARGIN_LEFT + slot * (i as f64 + 0.5) };
    let y_scale =
        |v: f64| -> f64 { MARGIN_TOP + plot_height - ((v - min_price) / range) * plot_height };

    // Axes
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        MARGIN_TOP,
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM
    ));
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM,
        CHART_WIDTH - MARGIN_RIGHT,
        CHART_HEIGHT - MARGIN_BOTTOM
    ));

    for price in [max_price, (max_price + min_price) / 2.0, min_price] {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"10\" fill=\"#666\">${:.2}</text>\n",
            MARGIN_LEFT - 5.0,
            y_scale(price) + 3.0,
            price
        ));
    }

    let mid = &quotes[quotes.len() / 2];
    for (i, quote) in [(0, first), (quotes.len() / 2, mid), (quotes.len() - 1, last)] {
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{}\" text-anchor=\"middle\" font-size=\"10\" fill=\"#666\">{}</text>\n",
            x_center(i),
            CHART_HEIGHT - MARGIN_BOTTOM + 16.0,
            quote.ts.date()
        ));
    }
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"11\" fill=\"#444\">Date</text>\n",
        MARGIN_LEFT + plot_width / 2.0,
        CHART_HEIGHT - 6.0
    ));
    svg.push_str(&format!(
        "  <text x=\"14\" y=\"{}\" text-anchor=\"middle\" font-size=\"11\" fill=\"#444\" transform=\"rotate(-90 14 {})\">Price ($)</text>\n",
        MARGIN_TOP + plot_height / 2.0,
        MARGIN_TOP + plot_height / 2.0
    ));

    for (i, quote) in quotes.iter().enumerate() {
        let color = if quote.is_up() { UP_COLOR } else { DOWN_COLOR };
        let x = x_center(i);
        let body_top = y_scale(quote.open.max(quote.close));
        let body_height = (y_scale(quote.open.min(quote.close)) - body_top).max(1.0);

        svg.push_str(&format!(
            "  <line x1=\"{x:.1}\" y1=\"{:.1}\" x2=\"{x:.1}\" y2=\"{:.1}\" stroke=\"{color}\" stroke-width=\"1\"/>\n",
            y_scale(quote.high),
            y_scale(quote.low)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{:.1}\" y=\"{body_top:.1}\" width=\"{body_width:.1}\" height=\"{body_height:.1}\" fill=\"{color}\"/>\n",
            x - body_width / 2.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}
