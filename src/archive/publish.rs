use crate::archive::config::RenderOptions;
use crate::archive::fsio;
use crate::archive::gallery::render_gallery;
use crate::archive::index::render_index;
use crate::archive::keys::{DayKey, MonthKey};
use crate::archive::paths::ArchivePaths;
use crate::archive::record::DailyRecord;
use crate::archive::report::{BatchReport, UnitReport, UnitStatus};
use crate::archive::store::{AggregateStore, MonthlyAggregate};
use crate::archive::upload::{Uploader, month_object_path};
use crate::error::{ArchiveErrorCode, StoreError};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct IngestOutcome {
    pub report: BatchReport,
    /// Months whose unit changed on disk.
    pub touched: BTreeSet<MonthKey>,
    /// Day count of every successfully merged month.
    pub month_sizes: BTreeMap<MonthKey, usize>,
}

/// Group fetched records by month, merge each month, and upload the months
/// that changed. Each month fails on its own.
pub fn ingest(
    store: &AggregateStore,
    records: impl IntoIterator<Item = (DayKey, DailyRecord)>,
    uploader: Option<&dyn Uploader>,
) -> IngestOutcome {
    let mut by_month: BTreeMap<MonthKey, MonthlyAggregate> = BTreeMap::new();
    for (day, record) in records {
        by_month.entry(day.month()).or_default().insert(day, record);
    }

    let mut out = IngestOutcome::default();
    for (month, days) in by_month {
        let merged = match store.merge(&month, days) {
            Ok(merged) => merged,
            Err(err) => {
                out.report.push(skipped_by(&err, "merge", &month));
                continue;
            }
        };
        out.month_sizes.insert(month.clone(), merged.aggregate.len());
        if !merged.changed {
            out.report.push(UnitReport::unchanged("merge", month.to_string()));
            continue;
        }
        out.report.push(UnitReport::written("merge", month.to_string()));
        out.touched.insert(month.clone());

        if let Some(uploader) = uploader {
            let mut unit = upload_one(uploader, &month, &merged.path);
            if let UnitStatus::Skipped { reason, .. } = &mut unit.status {
                // Later fetches see this month as unchanged and will not retry.
                reason.push_str(&format!(
                    "; remote copy is stale, retry with `upload --month {month}`"
                ));
            }
            out.report.push(unit);
        }
    }
    out
}

/// Upload the given months as they are on disk.
pub fn upload_months(
    store: &AggregateStore,
    uploader: &dyn Uploader,
    months: &BTreeSet<MonthKey>,
) -> BatchReport {
    let mut report = BatchReport::default();
    for month in months {
        let path = store.unit_path(month);
        if !path.is_file() {
            report.push(UnitReport::skipped(
                "upload",
                month.to_string(),
                ArchiveErrorCode::E006UploadFailed,
                format!("no monthly unit at {}", path.display()),
            ));
            continue;
        }
        report.push(upload_one(uploader, month, &path));
    }
    report
}

fn upload_one(uploader: &dyn Uploader, month: &MonthKey, local_path: &Path) -> UnitReport {
    let logical = month_object_path(month.as_str());
    match uploader.upload(&logical, local_path) {
        Ok(()) => UnitReport::written("upload", month.to_string()),
        Err(err) => UnitReport::skipped(
            "upload",
            month.to_string(),
            ArchiveErrorCode::E006UploadFailed,
            format!("{err:#}"),
        ),
    }
}

/// Regenerate gallery pages for `months`. Pages whose bytes would not change
/// are left alone; months with no unit on disk get no page.
pub fn publish_galleries(
    store: &AggregateStore,
    paths: &ArchivePaths,
    opts: &RenderOptions,
    months: &BTreeSet<MonthKey>,
) -> BatchReport {
    let mut report = BatchReport::default();
    for month in months {
        if !store.unit_path(month).is_file() {
            report.push(UnitReport::skipped(
                "gallery",
                month.to_string(),
                ArchiveErrorCode::E003InvalidKey,
                format!("no monthly unit for {month}"),
            ));
            continue;
        }
        let aggregate = match store.load(month) {
            Ok(aggregate) => aggregate,
            Err(err) => {
                report.push(skipped_by(&err, "gallery", month));
                continue;
            }
        };
        let doc = render_gallery(month, &aggregate, opts);
        let path = paths.gallery_file(month.as_str());
        report.push(write_document("gallery", month.as_str(), &path, &doc));
    }
    report
}

/// Regenerate the index document from every month in the store.
pub fn publish_index(
    store: &AggregateStore,
    paths: &ArchivePaths,
    opts: &RenderOptions,
) -> BatchReport {
    let mut report = BatchReport::default();
    let all_months = match store.list_month_keys() {
        Ok(months) => months,
        Err(err) => {
            report.push(UnitReport::skipped(
                "index",
                paths.index_file.display().to_string(),
                err.code(),
                err.to_string(),
            ));
            return report;
        }
    };

    // Only the latest month's records are rendered; older months just link.
    let mut aggregates = BTreeMap::new();
    if let Some(current) = all_months.last() {
        match store.load(current) {
            Ok(aggregate) => {
                aggregates.insert(current.clone(), aggregate);
            }
            Err(err) => report.push(skipped_by(&err, "index", current)),
        }
    }

    let doc = render_index(&all_months, &aggregates, opts, &paths.gallery_link_prefix());
    let unit = paths.index_file.display().to_string();
    report.push(write_document("index", &unit, &paths.index_file, &doc));
    report
}

fn write_document(stage: &'static str, unit: &str, path: &Path, doc: &str) -> UnitReport {
    match fsio::write_if_changed(path, doc.as_bytes()) {
        Ok(true) => UnitReport::written(stage, unit),
        Ok(false) => UnitReport::unchanged(stage, unit),
        Err(err) => UnitReport::skipped(
            stage,
            unit,
            ArchiveErrorCode::E007WriteFailed,
            format!("failed to write {}: {err}", path.display()),
        ),
    }
}

fn skipped_by(err: &StoreError, stage: &'static str, month: &MonthKey) -> UnitReport {
    UnitReport::skipped(stage, month.to_string(), err.code(), err.to_string())
}
