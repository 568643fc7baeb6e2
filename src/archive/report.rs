use crate::error::ArchiveErrorCode;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitStatus {
    Written,
    Unchanged,
    Skipped {
        #[serde(serialize_with = "serialize_code")]
        code: ArchiveErrorCode,
        reason: String,
    },
}

fn serialize_code<S: serde::Serializer>(code: &ArchiveErrorCode, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(code.as_str())
}

/// Outcome of one independently-failing unit: a month, a legacy file, a
/// feed entry, an upload or a rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitReport {
    pub stage: &'static str,
    pub unit: String,
    #[serde(flatten)]
    pub status: UnitStatus,
}

impl UnitReport {
    pub fn written(stage: &'static str, unit: impl Into<String>) -> Self {
        Self {
            stage,
            unit: unit.into(),
            status: UnitStatus::Written,
        }
    }

    pub fn unchanged(stage: &'static str, unit: impl Into<String>) -> Self {
        Self {
            stage,
            unit: unit.into(),
            status: UnitStatus::Unchanged,
        }
    }

    pub fn skipped(
        stage: &'static str,
        unit: impl Into<String>,
        code: ArchiveErrorCode,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            unit: unit.into(),
            status: UnitStatus::Skipped {
                code,
                reason: reason.into(),
            },
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, UnitStatus::Skipped { .. })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub units: Vec<UnitReport>,
}

impl BatchReport {
    pub fn push(&mut self, unit: UnitReport) {
        self.units.push(unit);
    }

    pub fn written(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Written))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Unchanged))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Skipped { .. }))
    }

    pub fn skipped_units(&self) -> impl Iterator<Item = &UnitReport> {
        self.units.iter().filter(|u| u.is_skipped())
    }

    fn count(&self, pred: impl Fn(&UnitStatus) -> bool) -> usize {
        self.units.iter().filter(|u| pred(&u.status)).count()
    }
}
