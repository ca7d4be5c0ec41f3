//! CLI argument definitions for stockscope.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `analyze` | Fetch one symbol and print the analysis |
//! | `session` | Read `SYMBOL [PERIOD]` lines from stdin, reusing one cache |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `text` | Output format (text, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | env or `10000` | Request timeout in ms |
//!
//! # Examples
//!
//! ```bash
//! stockscope analyze MSFT --period 6mo --view technical
//! stockscope analyze AAPL --format json --pretty --chart aapl.svg
//! printf 'AAPL\nAAPL 5y\n' | stockscope session
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use stockscope_core::{CacheMode, Period, DEFAULT_PERIOD, DEFAULT_SYMBOL};

/// Stock price history, moving averages and company fundamentals from Yahoo
/// Finance.
#[derive(Debug, Parser)]
#[command(
    name = "stockscope",
    author,
    version,
    about = "Single-symbol stock analysis",
    long_about = "stockscope fetches daily price history and company metadata from Yahoo Finance, \
caches each result for an hour, and reports 50/200-day moving averages, a crossover signal \
and a fundamentals summary.\n\
\n\
Set RUST_LOG=debug to see cache and fallback decisions on stderr."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Per-request timeout in milliseconds (overrides STOCKSCOPE_TIMEOUT_MS).
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Which sections the text output shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    /// Price summary and moving averages.
    Technical,
    /// Company overview, income statement and analyst recommendations.
    Fundamental,
    /// Everything, followed by the investment analysis.
    Full,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch and analyze one symbol.
    Analyze(AnalyzeArgs),
    /// Interactive loop reading `SYMBOL [PERIOD]` lines from stdin.
    Session(SessionArgs),
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Ticker symbol, e.g. AAPL, BRK-B, ^GSPC.
    #[arg(default_value = DEFAULT_SYMBOL)]
    pub symbol: String,

    #[arg(long, default_value_t = DEFAULT_PERIOD, value_parser = parse_period)]
    pub period: Period,

    #[arg(long, value_enum, default_value_t = View::Full)]
    pub view: View,

    /// Write an SVG candlestick chart to this path.
    #[arg(long)]
    pub chart: Option<PathBuf>,

    #[command(flatten)]
    pub cache: CacheArgs,
}

#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Period used when a line names only the symbol.
    #[arg(long, default_value_t = DEFAULT_PERIOD, value_parser = parse_period)]
    pub period: Period,

    #[arg(long, value_enum, default_value_t = View::Full)]
    pub view: View,

    #[command(flatten)]
    pub cache: CacheArgs,
}

#[derive(Debug, Clone, Copy, Args)]
pub struct CacheArgs {
    /// Ignore cached results but store the new one.
    #[arg(long, conflicts_with = "no_cache")]
    pub refresh: bool,

    /// Neither read nor write the cache.
    #[arg(long)]
    pub no_cache: bool,
}

impl CacheArgs {
    pub fn mode(self) -> CacheMode {
        if self.no_cache {
            CacheMode::Bypass
        } else if self.refresh {
            CacheMode::Refresh
        } else {
            CacheMode::Use
        }
    }
}

fn parse_period(raw: &str) -> Result<Period, String> {
    raw.parse::<Period>().map_err(|error| error.to_string())
}
