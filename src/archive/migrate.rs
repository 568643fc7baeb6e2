use crate::archive::keys::{DayKey, MonthKey};
use crate::archive::record::DailyRecord;
use crate::archive::report::{BatchReport, UnitReport};
use crate::archive::store::{AggregateStore, MonthlyAggregate};
use crate::error::ArchiveErrorCode;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const STAGE: &str = "migrate";

/// One file of the per-day layout: its stem and its parsed body, or the
/// reason the body could not be read.
#[derive(Debug, Clone)]
pub struct LegacyUnit {
    pub name: String,
    pub stem: String,
    pub body: Result<Value, String>,
}

#[derive(Debug, Clone, Default)]
pub struct LegacyCollection {
    pub months: BTreeMap<MonthKey, MonthlyAggregate>,
    pub report: BatchReport,
}

/// Read every `*.json` file of the per-day directory, in name order.
pub fn scan_legacy_dir(dir: &Path) -> Result<Vec<LegacyUnit>> {
    let read_dir =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    let mut files = Vec::new();
    for entry in read_dir {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
            files.push(path);
        }
    }
    files.sort();

    let mut out = Vec::with_capacity(files.len());
    for path in files {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let body = fs::read_to_string(&path)
            .map_err(|err| err.to_string())
            .and_then(|raw| serde_json::from_str::<Value>(&raw).map_err(|err| err.to_string()));
        out.push(LegacyUnit { name, stem, body });
    }
    Ok(out)
}

/// Validate per-day units and group the survivors by month. Every rejected
/// unit is reported; none aborts the batch.
pub fn collect_legacy_units(units: impl IntoIterator<Item = LegacyUnit>) -> LegacyCollection {
    let mut out = LegacyCollection::default();
    for unit in units {
        match extract_record(&unit) {
            Ok((day, record)) => {
                out.months
                    .entry(day.month())
                    .or_default()
                    .insert(day, record);
            }
            Err((code, reason)) => out
                .report
                .push(UnitReport::skipped(STAGE, unit.name, code, reason)),
        }
    }
    out
}

fn extract_record(
    unit: &LegacyUnit,
) -> Result<(DayKey, DailyRecord), (ArchiveErrorCode, String)> {
    let day = DayKey::parse(&unit.stem)
        .map_err(|err| (ArchiveErrorCode::E003InvalidKey, err.to_string()))?;
    let body = unit
        .body
        .as_ref()
        .map_err(|err| (ArchiveErrorCode::E004MalformedLegacy, err.clone()))?;
    let Some(first) = body.as_array().and_then(|items| items.first()) else {
        return Err((
            ArchiveErrorCode::E004MalformedLegacy,
            "body is not a non-empty list".to_string(),
        ));
    };
    let record: DailyRecord = serde_json::from_value(first.clone())
        .map_err(|err| (ArchiveErrorCode::E004MalformedLegacy, err.to_string()))?;
    match record.day_key() {
        Ok(from_date) if from_date == day => Ok((day, record)),
        Ok(from_date) => Err((
            ArchiveErrorCode::E003InvalidKey,
            format!("date field {from_date} does not match file key {day}"),
        )),
        Err(err) => Err((ArchiveErrorCode::E003InvalidKey, err.to_string())),
    }
}

/// Fold every collected month into the store through the regular merge, so
/// a re-run over the same input leaves every unit byte-identical.
pub fn apply_collection(store: &AggregateStore, collection: LegacyCollection) -> BatchReport {
    let mut report = collection.report;
    for (month, days) in collection.months {
        match store.merge(&month, days) {
            Ok(outcome) if outcome.changed => {
                report.push(UnitReport::written(STAGE, month.to_string()))
            }
            Ok(_) => report.push(UnitReport::unchanged(STAGE, month.to_string())),
            Err(err) => report.push(UnitReport::skipped(
                STAGE,
                month.to_string(),
                err.code(),
                err.to_string(),
            )),
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn legacy_body(date: &str, title: &str) -> Value {
        json!([{
            "date": date,
            "imgtitle": title,
            "imgdesc": "desc",
            "imgurl": "https://cn.bing.com/th?id=OHR.X_UHD.jpg"
        }])
    }

    fn write_legacy(dir: &Path, stem: &str, body: &str) {
        fs::create_dir_all(dir).expect("mkdir");
        fs::write(dir.join(format!("{stem}.json")), body).expect("write legacy");
    }

    fn unit(stem: &str, body: Value) -> LegacyUnit {
        LegacyUnit {
            name: format!("{stem}.json"),
            stem: stem.to_string(),
            body: Ok(body),
        }
    }

    #[test]
    fn valid_units_group_by_month() {
        let collection = collect_legacy_units(vec![
            unit("20250101", legacy_body("2025-01-01", "a")),
            unit("20250215", legacy_body("2025-02-15", "b")),
            unit("20250131", legacy_body("2025-01-31", "c")),
        ]);
        assert_eq!(collection.report.skipped(), 0);
        let months = collection
            .months
            .iter()
            .map(|(m, days)| (m.to_string(), days.len()))
            .collect::<Vec<_>>();
        assert_eq!(months, vec![("202501".to_string(), 2), ("202502".to_string(), 1)]);
    }

    #[test]
    fn malformed_units_are_skipped_and_reported() {
        let collection = collect_legacy_units(vec![
            unit("2025011", legacy_body("2025-01-01", "short name")),
            unit("20250102", json!([])),
            unit("20250103", json!({"date": "2025-01-03"})),
            unit("20250104", json!([{"date": "2025-01-04"}])),
            unit("20250105", legacy_body("2025-01-06", "mismatch")),
            LegacyUnit {
                name: "20250107.json".to_string(),
                stem: "20250107".to_string(),
                body: Err("expected value at line 1".to_string()),
            },
            unit("20250108", legacy_body("2025-01-08", "ok")),
        ]);

        let skipped = collection
            .report
            .skipped_units()
            .map(|u| u.unit.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            skipped,
            vec![
                "2025011.json",
                "20250102.json",
                "20250103.json",
                "20250104.json",
                "20250105.json",
                "20250107.json",
            ]
        );
        assert_eq!(collection.months.len(), 1);
        assert_eq!(collection.months.values().next().map(|d| d.len()), Some(1));
    }

    #[test]
    fn only_first_list_element_is_used() {
        let body = json!([
            {"date": "2025-01-01", "imgtitle": "first", "imgdesc": "", "imgurl": "u1"},
            {"date": "2025-01-01", "imgtitle": "second", "imgdesc": "", "imgurl": "u2"}
        ]);
        let collection = collect_legacy_units(vec![unit("20250101", body)]);
        let days = collection.months.values().next().expect("month");
        assert_eq!(days.values().next().map(|r| r.title.as_str()), Some("first"));
    }

    #[test]
    fn migration_rerun_is_byte_identical() {
        let tmp = tempdir().expect("tempdir");
        let legacy = tmp.path().join("date");
        write_legacy(&legacy, "20250101", &legacy_body("2025-01-01", "H | a").to_string());
        write_legacy(&legacy, "20250102", &legacy_body("2025-01-02", "H | b").to_string());
        write_legacy(&legacy, "20250201", &legacy_body("2025-02-01", "H | c").to_string());
        write_legacy(&legacy, "bogus", "[]");
        fs::write(legacy.join("README.txt"), "not a unit").expect("write txt");

        let store = AggregateStore::open(&tmp.path().join("month")).expect("open");

        let scan = || collect_legacy_units(scan_legacy_dir(&legacy).expect("scan"));
        let first = apply_collection(&store, scan());
        assert_eq!(first.written(), 2);
        assert_eq!(first.skipped(), 1);
        let jan = fs::read(store.month_dir().join("202501.json")).expect("jan");
        let feb = fs::read(store.month_dir().join("202502.json")).expect("feb");

        let second = apply_collection(&store, scan());
        assert_eq!(second.written(), 0);
        assert_eq!(second.unchanged(), 2);
        assert_eq!(fs::read(store.month_dir().join("202501.json")).expect("jan"), jan);
        assert_eq!(fs::read(store.month_dir().join("202502.json")).expect("feb"), feb);
    }

    #[test]
    fn migration_preserves_days_already_in_store() {
        let tmp = tempdir().expect("tempdir");
        let store = AggregateStore::open(&tmp.path().join("month")).expect("open");
        let seeded =
            collect_legacy_units(vec![unit("20250110", legacy_body("2025-01-10", "fresh"))]);
        apply_collection(&store, seeded);

        let legacy = collect_legacy_units(vec![unit("20250101", legacy_body("2025-01-01", "old"))]);
        apply_collection(&store, legacy);

        let month = store.load(&MonthKey::parse("202501").expect("month")).expect("load");
        assert_eq!(month.len(), 2);
    }

    #[test]
    fn corrupt_month_is_reported_not_overwritten() {
        let tmp = tempdir().expect("tempdir");
        let store = AggregateStore::open(&tmp.path().join("month")).expect("open");
        fs::write(store.month_dir().join("202501.json"), "garbage").expect("corrupt");

        let report = apply_collection(
            &store,
            collect_legacy_units(vec![
                unit("20250101", legacy_body("2025-01-01", "a")),
                unit("20250201", legacy_body("2025-02-01", "b")),
            ]),
        );
        assert_eq!(report.written(), 1);
        let skipped = report.skipped_units().collect::<Vec<_>>();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].unit, "202501");
        assert_eq!(
            fs::read_to_string(store.month_dir().join("202501.json")).expect("read"),
            "garbage"
        );
    }
}
