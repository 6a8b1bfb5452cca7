use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{date} falls on a {weekday}, no data is published for weekends")]
    WeekendDate { date: NaiveDate, weekday: chrono::Weekday },

    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Downloaded archive is not readable: {0}")]
    CorruptArchive(#[from] zip::result::ZipError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, FetchError>;

impl FetchError {
    /// Whether another attempt at the same transfer may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::HttpStatus { status, .. } => {
                matches!(status, 429 | 500 | 502 | 503 | 504)
            }
            FetchError::NetworkError(_) | FetchError::CorruptArchive(_) => true,
            _ => false,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            FetchError::WeekendDate { .. } => 1,
            FetchError::ConfigError { .. } | FetchError::InvalidConfigValueError { .. } => 2,
            _ => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FetchError::WeekendDate { .. } => {
                "Pick a date between Monday and Friday, or run again on a weekday"
            }
            FetchError::HttpStatus { status, .. } if *status == 404 => {
                "The files may not be published yet or the key anchor has drifted; check anchor_date/anchor_key"
            }
            FetchError::HttpStatus { .. } | FetchError::NetworkError(_) => {
                "Check network connectivity and download the files manually another time"
            }
            FetchError::IoError(_) => "Check that the output folder is writable",
            FetchError::CorruptArchive(_) => "The provider returned an invalid archive, retry later",
            FetchError::ConfigError { .. } | FetchError::InvalidConfigValueError { .. } => {
                "Fix the config file or remove it to use the built-in defaults"
            }
        }
    }
}
