mod analyze;
mod session;

use std::io;

use stockscope_core::{DataFetcher, FetcherConfig};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let mut config = FetcherConfig::from_env();
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Command::Analyze(args) => {
            let mut fetcher = DataFetcher::yahoo(config).with_cache_mode(args.cache.mode());
            analyze::run(args, &mut fetcher, cli.format, cli.pretty, &mut out).await
        }
        Command::Session(args) => {
            let mut fetcher = DataFetcher::yahoo(config).with_cache_mode(args.cache.mode());
            let stdin = io::stdin();
            session::run(args, &mut fetcher, cli.format, cli.pretty, stdin.lock(), &mut out).await
        }
    }
}
