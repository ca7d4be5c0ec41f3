use std::io::Write;

use stockscope_core::{DataFetcher, Symbol};

use crate::chart;
use crate::cli::{AnalyzeArgs, OutputFormat};
use crate::error::CliError;
use crate::output::{self, Analysis};

pub async fn run(
    args: &AnalyzeArgs,
    fetcher: &mut DataFetcher,
    format: OutputFormat,
    pretty: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let data = fetcher.fetch(&symbol, args.period).await?;

    let analysis = Analysis::build(&data)?;
    output::render(&analysis, args.view, format, pretty, out)?;

    if let Some(path) = &args.chart {
        chart::write_svg(path, &symbol, &data.history)?;
    }

    Ok(())
}
