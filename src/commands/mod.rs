pub mod fetch;
pub mod migrate;
pub mod render;
pub mod status;
pub mod upload;

use crate::archive::audit;
use crate::archive::keys::MonthKey;
use crate::archive::paths::ArchivePaths;
use crate::archive::report::{BatchReport, UnitStatus};
use crate::archive::store::AggregateStore;
use crate::archive::warn;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub warnings: Vec<String>,
    pub issues: Vec<String>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            details: Vec::new(),
            warnings: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    /// A unit was skipped; the command itself still succeeded.
    pub fn warning(&mut self, text: impl Into<String>) {
        self.warnings.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }

    /// Fold a batch into the report. Every skipped unit is also emitted as a
    /// warning line and recorded in the audit log.
    pub fn absorb_batch(&mut self, paths: &ArchivePaths, label: &str, batch: &BatchReport) {
        self.detail(format!(
            "{label}: written={} unchanged={} skipped={}",
            batch.written(),
            batch.unchanged(),
            batch.skipped()
        ));
        for unit in batch.skipped_units() {
            if let UnitStatus::Skipped { code, reason } = &unit.status {
                warn::emit(*code, unit.stage, &unit.unit, "skip-unit", reason);
                self.warning(format!(
                    "{} {} {}: {reason}",
                    code.as_str(),
                    unit.stage,
                    unit.unit
                ));
            }
        }
        for unit in &batch.units {
            let (status, message) = match &unit.status {
                UnitStatus::Written => ("written", unit.unit.clone()),
                UnitStatus::Unchanged => continue,
                UnitStatus::Skipped { code, reason } => (
                    "skipped",
                    format!("{} {}: {reason}", code.as_str(), unit.unit),
                ),
            };
            if let Err(err) = audit::append_event(paths, unit.stage, status, &message) {
                self.warning(format!("audit log write failed: {err:#}"));
            }
        }
    }
}

pub fn open_store(paths: &ArchivePaths, report: &mut CommandReport) -> Option<AggregateStore> {
    match AggregateStore::open(&paths.month_dir) {
        Ok(store) => Some(store),
        Err(err) => {
            report.issue(format!("{} {err}", err.code().as_str()));
            None
        }
    }
}

pub fn close_store(store: AggregateStore, report: &mut CommandReport) {
    if let Err(err) = store.close() {
        report.warning(format!("failed to release store lock: {err}"));
    }
}

/// Parse `--month` values; invalid ones become issues.
pub fn parse_months(raw: &[String], report: &mut CommandReport) -> BTreeSet<MonthKey> {
    let mut out = BTreeSet::new();
    for value in raw {
        match MonthKey::parse(value.trim()) {
            Ok(month) => {
                out.insert(month);
            }
            Err(err) => report.issue(err.to_string()),
        }
    }
    out
}
