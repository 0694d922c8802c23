use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use preload::cli::App;
use preload::{Acquirer, Config, health, ui};
use preload_fetch::ReqwestClient;

fn main() -> ExitCode {
    let app = App::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&app.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match app.config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(err.exit_code());
        }
    };

    let result = if app.list {
        list(&config)
    } else {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")
            .and_then(|runtime| runtime.block_on(run(&config)))
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:?}");
            let code = err
                .downcast_ref::<preload::Error>()
                .map_or(2, preload::Error::exit_code);
            ExitCode::from(code)
        }
    }
}

fn list(config: &Config) -> anyhow::Result<()> {
    let targets = config.targets()?;
    println!("{}", ui::targets_table(&targets));
    Ok(())
}

async fn run(config: &Config) -> anyhow::Result<()> {
    let targets = config.targets()?;
    tracing::debug!(data_dir = %config.data_dir.display(), targets = targets.len(), "resolved targets");

    let client =
        ReqwestClient::with_timeouts(config.timeouts).context("failed to build HTTP client")?;
    let acquirer = Acquirer::new(client)
        .with_retries(config.retries)
        .with_progress(config.progress);

    let outcomes = preload::run(&acquirer, &targets, &health::default_checks()).await?;
    let downloads = outcomes.iter().filter(|o| o.downloaded).count();
    tracing::info!(downloads, targets = outcomes.len(), "acquisition complete");

    println!("All good");
    Ok(())
}
