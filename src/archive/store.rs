use crate::archive::fsio;
use crate::archive::keys::{DayKey, MonthKey};
use crate::archive::record::DailyRecord;
use crate::error::StoreError;
use fs2::FileExt;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Day records of one month, ordered by key.
pub type MonthlyAggregate = BTreeMap<DayKey, DailyRecord>;

const LOCK_FILE: &str = ".archive.lock";
const UNIT_EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub aggregate: MonthlyAggregate,
    pub changed: bool,
    pub path: PathBuf,
}

/// Handle on the directory of monthly units.
///
/// Holds an exclusive advisory lock for its whole lifetime; a second writer
/// fails at `open` instead of racing on the same month files.
#[derive(Debug)]
pub struct AggregateStore {
    month_dir: PathBuf,
    lock: File,
}

impl AggregateStore {
    pub fn open(month_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(month_dir).map_err(|e| StoreError::io(month_dir, e))?;
        let lock_path = month_dir.join(LOCK_FILE);
        let lock = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)
            .map_err(|e| StoreError::io(&lock_path, e))?;
        if lock.try_lock_exclusive().is_err() {
            return Err(StoreError::Locked(month_dir.to_path_buf()));
        }
        Ok(Self {
            month_dir: month_dir.to_path_buf(),
            lock,
        })
    }

    pub fn close(self) -> Result<(), StoreError> {
        let lock_path = self.month_dir.join(LOCK_FILE);
        FileExt::unlock(&self.lock).map_err(|e| StoreError::io(lock_path, e))
    }

    pub fn month_dir(&self) -> &Path {
        &self.month_dir
    }

    pub fn unit_path(&self, month: &MonthKey) -> PathBuf {
        self.month_dir.join(format!("{month}.{UNIT_EXTENSION}"))
    }

    /// Read one month. A month with no unit on disk is empty, not an error.
    pub fn load(&self, month: &MonthKey) -> Result<MonthlyAggregate, StoreError> {
        let path = self.unit_path(month);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(MonthlyAggregate::new()),
            Err(err) => {
                return Err(StoreError::CorruptUnit {
                    path,
                    reason: err.to_string(),
                });
            }
        };
        let aggregate: MonthlyAggregate =
            serde_json::from_str(&raw).map_err(|err| StoreError::CorruptUnit {
                path: path.clone(),
                reason: err.to_string(),
            })?;
        if let Some(day) = aggregate.keys().find(|day| day.month() != *month) {
            return Err(StoreError::CorruptUnit {
                path,
                reason: format!("day {day} does not belong to month {month}"),
            });
        }
        Ok(aggregate)
    }

    /// Upsert `incoming` over the persisted month and write the result.
    ///
    /// Incoming days replace existing ones; days not in `incoming` are kept.
    /// A corrupt unit fails this month only and is left untouched on disk.
    /// Nothing is written when the merged bytes equal the current file.
    pub fn merge(
        &self,
        month: &MonthKey,
        incoming: MonthlyAggregate,
    ) -> Result<MergeOutcome, StoreError> {
        if let Some(day) = incoming.keys().find(|day| day.month() != *month) {
            return Err(StoreError::ForeignDay {
                month: month.to_string(),
                day: day.to_string(),
            });
        }

        let mut aggregate = self.load(month)?;
        aggregate.extend(incoming);

        let path = self.unit_path(month);
        let data = encode_unit(&aggregate).map_err(|source| StoreError::Serialize {
            path: path.clone(),
            source,
        })?;
        let changed = fsio::write_if_changed(&path, data.as_bytes())
            .map_err(|e| StoreError::io(&path, e))?;

        Ok(MergeOutcome {
            aggregate,
            changed,
            path,
        })
    }

    /// Every month with a unit on disk. Files that are not `<YYYYMM>.json`
    /// are not units and are ignored.
    pub fn list_month_keys(&self) -> Result<BTreeSet<MonthKey>, StoreError> {
        let read_dir =
            fs::read_dir(&self.month_dir).map_err(|e| StoreError::io(&self.month_dir, e))?;
        let mut out = BTreeSet::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| StoreError::io(&self.month_dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|s| s.to_str()) != Some(UNIT_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Ok(month) = MonthKey::parse(stem) {
                out.insert(month);
            }
        }
        Ok(out)
    }
}

/// Pretty JSON, two-space indent, keys ascending, trailing newline.
pub fn encode_unit(aggregate: &MonthlyAggregate) -> serde_json::Result<String> {
    let data = serde_json::to_string_pretty(aggregate)?;
    Ok(format!("{data}\n"))
}
