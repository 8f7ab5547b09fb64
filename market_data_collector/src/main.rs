use std::{process::ExitCode, sync::Arc, time::Instant};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use market_data_collector::{
    cli::{commands::Cli, init_tracing, params::today_in},
    collect::CollectCommand,
    providers::alpaca_rest::{AlpacaConfig, AlpacaProvider},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    // Credentials may come from a local .env file.
    let _ = dotenvy::dotenv();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let started = Instant::now();

    let config = AlpacaConfig::load(cli.config.as_deref())?;
    let provider = AlpacaProvider::new(config).context("failed to create alpaca provider")?;

    let end = cli.end.unwrap_or_else(|| today_in(&cli.tz));
    let cmd = CollectCommand::new(cli.sym, cli.start, end, cli.dir, cli.tz, Arc::new(provider))
        .with_timeframe(cli.timeframe)
        .init()
        .context("failed to initialize command")?;

    info!(
        archive = %cmd.archive_path().display(),
        segments = cmd.segments().len(),
        "running command"
    );

    cmd.run().await.context("command failed")?;

    info!(time_sec = started.elapsed().as_secs_f64(), "command complete");
    Ok(())
}
