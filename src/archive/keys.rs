use crate::error::KeyError;
use chrono::{Month, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `YYYYMMDD` key of one record inside a monthly unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayKey(String);

/// `YYYYMM` key of one monthly unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey(String);

fn all_digits(raw: &str, len: usize) -> bool {
    raw.len() == len && raw.bytes().all(|b| b.is_ascii_digit())
}

impl DayKey {
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        if !all_digits(raw, 8) {
            return Err(KeyError::InvalidDayKey(raw.to_string()));
        }
        if NaiveDate::parse_from_str(raw, "%Y%m%d").is_err() {
            return Err(KeyError::NoSuchDay(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// Derive the key from a `YYYY-MM-DD` date field.
    pub fn from_date_field(date: &str) -> Result<Self, KeyError> {
        let parts = date.split('-').collect::<Vec<_>>();
        let shape_ok = matches!(
            parts.as_slice(),
            [y, m, d] if all_digits(y, 4) && all_digits(m, 2) && all_digits(d, 2)
        );
        if !shape_ok {
            return Err(KeyError::InvalidDate(date.to_string()));
        }
        Self::parse(&parts.concat())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format("%Y%m%d").to_string())
    }

    pub fn month(&self) -> MonthKey {
        MonthKey(self.0[..6].to_string())
    }

    /// Canonical `YYYY-MM-DD` form of this key.
    pub fn date_field(&self) -> String {
        format!("{}-{}-{}", &self.0[..4], &self.0[4..6], &self.0[6..])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl MonthKey {
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        if !all_digits(raw, 6) {
            return Err(KeyError::InvalidMonthKey(raw.to_string()));
        }
        if !matches!(raw[4..].parse::<u8>(), Ok(1..=12)) {
            return Err(KeyError::NoSuchMonth(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn year(&self) -> &str {
        &self.0[..4]
    }

    pub fn month_digits(&self) -> &str {
        &self.0[4..]
    }

    /// Month number without a leading zero, as used for archive link labels.
    pub fn month_label(&self) -> String {
        let digits = self.month_digits().trim_start_matches('0');
        if digits.is_empty() {
            "0".to_string()
        } else {
            digits.to_string()
        }
    }

    /// `"January 2025"`.
    pub fn display_name(&self) -> String {
        let name = self
            .month_digits()
            .parse::<u8>()
            .ok()
            .and_then(|n| Month::try_from(n).ok())
            .map(|m| m.name().to_string())
            .unwrap_or_else(|| self.month_digits().to_string());
        format!("{name} {}", self.year())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_key_impls {
    ($ty:ty) => {
        impl TryFrom<String> for $ty {
            type Error = KeyError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_key_impls!(DayKey);
string_key_impls!(MonthKey);
