use crate::core::engine::EngineSettings;
use crate::core::fetcher::RetryPolicy;
use crate::domain::model::KeyAnchor;
use crate::utils::error::{FetchError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{validate_path, validate_range, validate_url, Validate};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://links.sgx.com/1.0.0/derivatives-historical";
pub const DEFAULT_LOG_FILE: &str = "sgx_files.log";
pub const MAX_RETRIES_LIMIT: u32 = 20;
pub const RETRY_DELAY_LIMIT: u64 = 300;

/// Layout of the config file: everything lives under a `[Default]` table.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    #[serde(rename = "Default")]
    default: FetchConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub max_retries: u32,
    /// Seconds before the first re-attempt; doubles on each further one.
    pub retry_delay: u64,
    pub folder_path_base: PathBuf,
    pub api_url: String,
    /// Deadline in seconds for a whole request, body included. Unset means
    /// no deadline.
    pub request_timeout: Option<u64>,
    pub log_file: PathBuf,
    pub log_format: LogFormat,
    pub anchor_date: NaiveDate,
    pub anchor_key: i64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let anchor = KeyAnchor::default();
        Self {
            max_retries: 3,
            retry_delay: 1,
            folder_path_base: PathBuf::from("."),
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: None,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            log_format: LogFormat::Text,
            anchor_date: anchor.date,
            anchor_key: anchor.key,
        }
    }
}

impl FetchConfig {
    /// Loads and validates the config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let file: ConfigFile =
            toml::from_str(&processed_content).map_err(|e| FetchError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            })?;

        file.default.validate()?;
        Ok(file.default)
    }

    /// Falls back to the built-in defaults when the file is missing, malformed
    /// or invalid. The reason is handed back so it can be logged once logging
    /// is up.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> (Self, Option<FetchError>) {
        match Self::from_file(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Replaces `${VAR}` with the environment variable's value. Unknown
    /// variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_secs(self.retry_delay))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout.map(Duration::from_secs)
    }

    pub fn anchor(&self) -> KeyAnchor {
        KeyAnchor {
            date: self.anchor_date,
            key: self.anchor_key,
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            api_url: self.api_url.clone(),
            folder_path_base: self.folder_path_base.clone(),
            anchor: self.anchor(),
            retry: self.retry_policy(),
        }
    }
}

impl Validate for FetchConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api_url", &self.api_url)?;
        validate_path("folder_path_base", &self.folder_path_base.to_string_lossy())?;
        validate_path("log_file", &self.log_file.to_string_lossy())?;
        validate_range("max_retries", self.max_retries, 0, MAX_RETRIES_LIMIT)?;
        validate_range("retry_delay", self.retry_delay, 0, RETRY_DELAY_LIMIT)?;
        if let Some(timeout) = self.request_timeout {
            validate_range("request_timeout", timeout, 1, 86_400)?;
        }
        validate_range("anchor_key", self.anchor_key, 0, i64::from(u32::MAX))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[Default]
max_retries = 5
retry_delay = 2
folder_path_base = "/data/sgx/"
api_url = "https://mirror.example.com/derivatives-historical"
request_timeout = 30
log_file = "/var/log/sgx_files.log"
log_format = "json"
anchor_date = "2024-01-02"
anchor_key = 5573
"#;

        let config = FetchConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_policy().retry_delay, Duration::from_secs(2));
        assert_eq!(config.folder_path_base, PathBuf::from("/data/sgx/"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(
            config.anchor(),
            KeyAnchor {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                key: 5573,
            }
        );
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let toml_content = r#"
[Default]
max_retries = 1
folder_path_base = "/srv/sgx"
"#;

        let config = FetchConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.retry_delay, 1);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.anchor(), KeyAnchor::default());
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_missing_default_table_is_an_error() {
        assert!(FetchConfig::from_toml_str("max_retries = 3\n").is_err());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SGX_FETCH_TEST_FOLDER", "/mnt/market-data");

        let toml_content = r#"
[Default]
folder_path_base = "${SGX_FETCH_TEST_FOLDER}/sgx"
"#;

        let config = FetchConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.folder_path_base, PathBuf::from("/mnt/market-data/sgx"));

        std::env::remove_var("SGX_FETCH_TEST_FOLDER");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad_url = "[Default]\napi_url = \"links.sgx.com\"\n";
        assert!(matches!(
            FetchConfig::from_toml_str(bad_url),
            Err(FetchError::InvalidConfigValueError { .. })
        ));

        let too_many = "[Default]\nmax_retries = 500\n";
        assert!(FetchConfig::from_toml_str(too_many).is_err());

        let zero_timeout = "[Default]\nrequest_timeout = 0\n";
        assert!(FetchConfig::from_toml_str(zero_timeout).is_err());
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[Default\nmax_retries = ").unwrap();

        let (config, error) = FetchConfig::load_or_default(temp_file.path());
        assert_eq!(config, FetchConfig::default());
        assert!(matches!(error, Some(FetchError::ConfigError { .. })));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let (config, error) = FetchConfig::load_or_default("/nonexistent/sgx/config.toml");
        assert_eq!(config, FetchConfig::default());
        assert_eq!(config.request_timeout(), None);
        assert!(matches!(error, Some(FetchError::IoError(_))));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[Default]\nmax_retries = 2\nretry_delay = 10\n")
            .unwrap();

        let (config, error) = FetchConfig::load_or_default(temp_file.path());
        assert!(error.is_none());
        assert_eq!(config.retry_policy(), RetryPolicy::new(2, Duration::from_secs(10)));
    }
}
