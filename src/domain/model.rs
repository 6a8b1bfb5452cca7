use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// How the download date was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    Explicit,
    Yesterday,
    /// Run on a Monday: yesterday was Sunday, so the previous Friday is used.
    RolledBackToFriday,
}

/// What the user asked for on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRequest {
    Explicit(NaiveDate),
    Yesterday,
}

impl From<Option<NaiveDate>> for DateRequest {
    fn from(date: Option<NaiveDate>) -> Self {
        date.map_or(DateRequest::Yesterday, DateRequest::Explicit)
    }
}

/// A resolved business day whose files will be downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDate {
    pub date: NaiveDate,
    pub source: DateSource,
}

impl RequestDate {
    /// `yyyymmdd`, as used in the provider's file names.
    pub fn compact(&self) -> String {
        self.date.format("%Y%m%d").to_string()
    }
}

impl fmt::Display for RequestDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format("%Y-%m-%d"))
    }
}

/// Fixed point of the provider's numbering: `date` is served under `key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyAnchor {
    pub date: NaiveDate,
    pub key: i64,
}

pub const DEFAULT_ANCHOR_KEY: i64 = 5455;

impl Default for KeyAnchor {
    fn default() -> Self {
        Self {
            date: NaiveDate::from_ymd_opt(2023, 7, 4).expect("anchor date is a valid calendar date"),
            key: DEFAULT_ANCHOR_KEY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey(pub i64);

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub file_name: String,
    pub url: String,
    pub folder: PathBuf,
    pub destination_path: PathBuf,
}

impl DownloadTarget {
    pub fn is_archive(&self) -> bool {
        self.file_name.ends_with(".zip")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    Saved { bytes: u64 },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub file_name: String,
    pub destination_path: PathBuf,
    pub attempts: u32,
    pub status: DownloadStatus,
}

impl DownloadOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self.status, DownloadStatus::Saved { .. })
    }
}

#[derive(Debug, Clone)]
pub struct FetchReport {
    pub date: RequestDate,
    pub key: ResourceKey,
    pub outcomes: Vec<DownloadOutcome>,
}

impl FetchReport {
    pub fn saved(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_saved()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.outcomes.iter().filter(|o| !o.is_saved())
    }
}

/// Structured events emitted by the resolver, fetcher and engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    DateRolledBack {
        today: NaiveDate,
        resolved: NaiveDate,
    },
    FutureDate {
        date: NaiveDate,
        today: NaiveDate,
    },
    KeyResolved {
        date: NaiveDate,
        key: ResourceKey,
    },
    AttemptFailed {
        file_name: String,
        attempt: u32,
        max_attempts: u32,
        error: String,
        retry_in: Duration,
    },
    Downloaded {
        file_name: String,
        destination_path: PathBuf,
        bytes: u64,
        attempts: u32,
    },
    Failed {
        file_name: String,
        attempts: u32,
        error: String,
    },
}
