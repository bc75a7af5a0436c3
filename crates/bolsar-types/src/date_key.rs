//! Acquisition target dates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::DateKeyError;

/// Format of a date key, both on the portal and on disk.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A trading date identifying one closing-data acquisition.
///
/// The key renders as `YYYY-MM-DD`; that string names both the portal page
/// and the destination directory, whose existence marks the date as acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Creates a key from a calendar date.
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parses a `YYYY-MM-DD` string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid calendar date.
    pub fn parse(input: &str) -> Result<Self, DateKeyError> {
        NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|_| DateKeyError::Malformed {
                input: input.to_string(),
            })
    }

    /// Returns today's date in local time.
    #[must_use]
    pub fn today() -> Self {
        Self(chrono::Local::now().date_naive())
    }

    /// Returns the underlying calendar date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.0
    }

    /// Returns the destination directory for this date under `root`.
    #[must_use]
    pub fn directory_in(&self, root: &Path) -> PathBuf {
        root.join(self.to_string())
    }
}

impl std::fmt::Display for DateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl std::str::FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DateKey {
    type Error = DateKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let key = DateKey::parse("2023-07-14").unwrap();
        assert_eq!(key.date(), NaiveDate::from_ymd_opt(2023, 7, 14).unwrap());
        assert_eq!(key.to_string(), "2023-07-14");
    }

    #[test]
    fn test_parse_pads_single_digits() {
        let key = DateKey::new(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(key.to_string(), "2024-01-05");
    }

    #[test]
    fn test_parse_rejects_other_formats() {
        assert!(DateKey::parse("14/07/2023").is_err());
        assert!(DateKey::parse("2023-02-30").is_err());
        assert!(DateKey::parse("").is_err());
    }

    #[test]
    fn test_directory_in() {
        let key: DateKey = "2023-07-14".parse().unwrap();
        let dir = key.directory_in(Path::new("/data/closing"));
        assert_eq!(dir, PathBuf::from("/data/closing/2023-07-14"));
    }

    #[test]
    fn test_serde_as_string() {
        let key = DateKey::parse("2023-07-14").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"2023-07-14\"");
        let back: DateKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
