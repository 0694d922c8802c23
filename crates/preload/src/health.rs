//! Post-acquisition checks.

use std::io;

use crate::error::{Error, Result};
use crate::target::AcquisitionTarget;

pub trait HealthCheck: Send + Sync {
    fn name(&self) -> &str;
    fn check(&self, targets: &[AcquisitionTarget]) -> Result<()>;
}

/// Always passes. Placeholder for checks that exercise consumers of the data.
#[derive(Debug, Clone, Copy, Default)]
pub struct Noop;

impl HealthCheck for Noop {
    fn name(&self) -> &str {
        "noop"
    }

    fn check(&self, _targets: &[AcquisitionTarget]) -> Result<()> {
        Ok(())
    }
}

/// Fails on the first target that is not satisfied on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetsSatisfied;

impl HealthCheck for TargetsSatisfied {
    fn name(&self) -> &str {
        "targets-satisfied"
    }

    fn check(&self, targets: &[AcquisitionTarget]) -> Result<()> {
        match targets.iter().find(|t| !t.is_satisfied()) {
            None => Ok(()),
            Some(target) => Err(Error::io(
                target.marker_path(),
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("target '{}' is not satisfied", target.name),
                ),
            )),
        }
    }
}

pub fn default_checks() -> Vec<Box<dyn HealthCheck>> {
    vec![Box::new(TargetsSatisfied), Box::new(Noop)]
}

/// Run `checks` in order. A failing check is reported as
/// [`Error::HealthCheckFailed`] with the check's own error as its source.
pub fn run_checks(checks: &[Box<dyn HealthCheck>], targets: &[AcquisitionTarget]) -> Result<()> {
    for check in checks {
        match check.check(targets) {
            Ok(()) => tracing::debug!(check = check.name(), "health check passed"),
            Err(err @ Error::HealthCheckFailed { .. }) => return Err(err),
            Err(err) => {
                return Err(Error::HealthCheckFailed {
                    check: check.name().to_string(),
                    reason: Box::new(err),
                });
            }
        }
    }
    Ok(())
}
