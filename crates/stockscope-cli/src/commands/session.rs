use std::io::{BufRead, Write};

use stockscope_core::{DataFetcher, Period, Symbol};

use crate::cli::{OutputFormat, SessionArgs};
use crate::error::CliError;
use crate::output::{self, Analysis};

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Blank,
    Quit,
    Request(Symbol, Period),
}

fn parse_line(line: &str, default_period: Period) -> Result<Line, CliError> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Ok(Line::Blank);
    };
    if first.eq_ignore_ascii_case("quit") || first.eq_ignore_ascii_case("exit") {
        return Ok(Line::Quit);
    }

    let symbol = Symbol::parse(first)?;
    let period = match words.next() {
        Some(raw) => raw.parse::<Period>()?,
        None => default_period,
    };
    Ok(Line::Request(symbol, period))
}

/// Serves `SYMBOL [PERIOD]` lines until `quit`, `exit` or end of input.
///
/// Bad input and failed fetches are reported inline and the session goes
/// on; only output failures end it early.
pub async fn run(
    args: &SessionArgs,
    fetcher: &mut DataFetcher,
    format: OutputFormat,
    pretty: bool,
    input: impl BufRead,
    out: &mut impl Write,
) -> Result<(), CliError> {
    for line in input.lines() {
        let (symbol, period) = match parse_line(&line?, args.period) {
            Ok(Line::Blank) => continue,
            Ok(Line::Quit) => break,
            Ok(Line::Request(symbol, period)) => (symbol, period),
            Err(error) => {
                writeln!(out, "error: {error}")?;
                continue;
            }
        };

        match fetcher.fetch(&symbol, period).await {
            Ok(data) => {
                let analysis = Analysis::build(&data)?;
                output::render(&analysis, args.view, format, pretty, out)?;
            }
            Err(error) => {
                tracing::warn!(%symbol, %period, code = error.code(), "fetch failed");
                writeln!(out, "error: {error}")?;
            }
        }
        writeln!(out)?;
        tracing::debug!(cached = fetcher.cached_entries(), "session request served");
    }

    Ok(())
}
