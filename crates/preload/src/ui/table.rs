use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::target::AcquisitionTarget;

/// One line of `--list` output.
#[derive(Debug, Clone, Tabled)]
pub struct TargetRow {
    #[tabled(rename = "NAME")]
    pub name: String,
    #[tabled(rename = "STATUS")]
    pub status: &'static str,
    #[tabled(rename = "PATH")]
    pub path: String,
    #[tabled(rename = "URL")]
    pub url: String,
}

impl From<&AcquisitionTarget> for TargetRow {
    fn from(target: &AcquisitionTarget) -> Self {
        let status = if target.is_satisfied() {
            "ready"
        } else if target.archive_present() {
            "pending"
        } else {
            "missing"
        };
        Self {
            name: target.name.clone(),
            status,
            path: target.marker_path().display().to_string(),
            url: target.remote_url.clone(),
        }
    }
}

pub fn targets_table(targets: &[AcquisitionTarget]) -> Table {
    let mut table = Table::new(targets.iter().map(TargetRow::from));
    table.with(Style::blank());
    table
}
