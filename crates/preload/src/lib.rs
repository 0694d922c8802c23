//! Idempotent acquisition of the datasets and pretrained embeddings a
//! development setup needs.
//!
//! A run resolves a list of [`AcquisitionTarget`]s from a [`Config`], brings
//! each one to its satisfied state with an [`Acquirer`], then runs the
//! [`health`] checks. Presence on disk is the only state: nothing is recorded
//! between runs.

pub mod acquire;
pub mod cli;
pub mod config;
mod error;
pub mod health;
pub mod target;
pub mod ui;

pub use acquire::{Acquirer, Outcome, ensure_directory};
pub use config::{Config, DATA_DIR_ENV, Manifest};
pub use error::{Error, Result};
pub use health::{HealthCheck, Noop, TargetsSatisfied};
pub use target::{AcquisitionTarget, builtin_targets};

use preload_fetch::HttpClient;

/// Acquire `targets` in order, then run `checks` against them.
pub async fn run<C: HttpClient>(
    acquirer: &Acquirer<C>,
    targets: &[AcquisitionTarget],
    checks: &[Box<dyn HealthCheck>],
) -> Result<Vec<Outcome>> {
    let outcomes = acquirer.acquire_all(targets).await?;
    health::run_checks(checks, targets)?;
    Ok(outcomes)
}
