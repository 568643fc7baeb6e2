use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveErrorCode {
    E001Locked,
    E002CorruptUnit,
    E003InvalidKey,
    E004MalformedLegacy,
    E005FeedFailed,
    E006UploadFailed,
    E007WriteFailed,
}

impl ArchiveErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::E001Locked => "E001_LOCKED",
            Self::E002CorruptUnit => "E002_CORRUPT_UNIT",
            Self::E003InvalidKey => "E003_INVALID_KEY",
            Self::E004MalformedLegacy => "E004_MALFORMED_LEGACY",
            Self::E005FeedFailed => "E005_FEED_FAILED",
            Self::E006UploadFailed => "E006_UPLOAD_FAILED",
            Self::E007WriteFailed => "E007_WRITE_FAILED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("day key must be exactly 8 ascii digits, got `{0}`")]
    InvalidDayKey(String),
    #[error("month key must be exactly 6 ascii digits, got `{0}`")]
    InvalidMonthKey(String),
    #[error("day key `{0}` names no calendar day")]
    NoSuchDay(String),
    #[error("month key `{0}` names no calendar month")]
    NoSuchMonth(String),
    #[error("date `{0}` is not in YYYY-MM-DD form")]
    InvalidDate(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("archive store at {0} is locked by another process")]
    Locked(PathBuf),
    #[error("monthly unit {path} is unreadable: {reason}")]
    CorruptUnit { path: PathBuf, reason: String },
    #[error("day {day} does not belong to month {month}")]
    ForeignDay { month: String, day: String },
    #[error("i/o failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize monthly unit {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn code(&self) -> ArchiveErrorCode {
        match self {
            Self::Locked(_) => ArchiveErrorCode::E001Locked,
            Self::CorruptUnit { .. } => ArchiveErrorCode::E002CorruptUnit,
            Self::ForeignDay { .. } => ArchiveErrorCode::E003InvalidKey,
            Self::Io { .. } | Self::Serialize { .. } => ArchiveErrorCode::E007WriteFailed,
        }
    }
}
