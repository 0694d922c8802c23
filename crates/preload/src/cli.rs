use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use preload_fetch::Timeouts;

use crate::config::{Config, DATA_DIR_ENV};
use crate::error::{Error, Result};

#[derive(Clone, Debug, Parser)]
#[command(name = "preload", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
/// Download and unpack the datasets and embeddings used by the exercises.
pub struct App {
    /// Base directory for all downloaded data.
    #[arg(long, env = DATA_DIR_ENV, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// TOML manifest replacing the built-in targets.
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Targets to leave out (comma separated or repeated).
    #[arg(long, value_name = "NAME", value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Give up on a download after this many seconds.
    #[arg(long, value_name = "SECS", value_parser = parse_seconds)]
    pub timeout: Option<Duration>,

    /// Give up connecting after this many seconds.
    #[arg(long, value_name = "SECS", value_parser = parse_seconds)]
    pub connect_timeout: Option<Duration>,

    /// Retry failed downloads this many times.
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    /// Never draw progress bars.
    #[arg(long)]
    pub no_progress: bool,

    /// Print the targets and whether they are already present, then exit.
    #[arg(long)]
    pub list: bool,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, value_name = "FILTER", default_value = "preload=info")]
    pub log_level: String,
}

impl App {
    pub fn config(&self) -> Result<Config> {
        let data_dir = self
            .data_dir
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(Error::ConfigurationMissing)?;

        Ok(Config {
            data_dir,
            manifest: self.manifest.clone(),
            skip: self.skip.clone(),
            timeouts: Timeouts {
                connect: self.connect_timeout,
                total: self.timeout,
            },
            retries: self.retries,
            progress: !self.no_progress && std::io::stderr().is_terminal(),
        })
    }
}

fn parse_seconds(value: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number of seconds"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("'{value}' must be a positive number of seconds"));
    }
    Ok(Duration::from_secs_f64(secs))
}
