use anyhow::Result;
use std::path::PathBuf;

use crate::archive::migrate::{apply_collection, collect_legacy_units, scan_legacy_dir};
use crate::archive::paths::resolve_paths;
use crate::commands::{CommandReport, close_store, open_store};

#[derive(Debug, Clone, Default)]
pub struct MigrateOptions {
    pub legacy_dir: Option<PathBuf>,
}

pub fn run(opts: &MigrateOptions) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let legacy_dir = opts.legacy_dir.clone().unwrap_or_else(|| paths.legacy_dir.clone());
    let mut report = CommandReport::new("migrate");

    report.detail(format!("legacy_dir={}", legacy_dir.display()));
    report.detail(format!("month_dir={}", paths.month_dir.display()));

    if !legacy_dir.is_dir() {
        report.issue("legacy dir does not exist");
        return Ok(report);
    }

    let units = scan_legacy_dir(&legacy_dir)?;
    report.detail(format!("legacy_files={}", units.len()));
    let collection = collect_legacy_units(units);

    let Some(store) = open_store(&paths, &mut report) else {
        return Ok(report);
    };
    let batch = apply_collection(&store, collection);
    report.absorb_batch(&paths, "migrate", &batch);
    close_store(store, &mut report);

    Ok(report)
}
