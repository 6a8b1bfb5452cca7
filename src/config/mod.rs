pub mod toml_config;

#[cfg(feature = "cli")]
use self::toml_config::{FetchConfig, MAX_RETRIES_LIMIT, RETRY_DELAY_LIMIT};
#[cfg(feature = "cli")]
use chrono::NaiveDate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "sgx-fetch")]
#[command(about = "Downloads SGX Time and Sales historical data")]
pub struct CliArgs {
    /// Date of the files to download (yyyy-mm-dd). Defaults to the previous business day
    #[arg(value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Base folder for the date-stamped download folders
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Re-attempts after the first failed transfer of a file
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=MAX_RETRIES_LIMIT as i64))]
    pub max_retries: Option<u32>,

    /// Seconds before the first re-attempt
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=RETRY_DELAY_LIMIT))]
    pub retry_delay: Option<u64>,

    /// Show what would be downloaded without downloading
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Also print info-level logs to stderr")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl FetchConfig {
    /// Command-line flags win over the config file.
    pub fn apply_cli(&mut self, args: &CliArgs) {
        if let Some(output) = &args.output {
            self.folder_path_base = output.clone();
        }
        if let Some(max_retries) = args.max_retries {
            self.max_retries = max_retries;
        }
        if let Some(retry_delay) = args.retry_delay {
            self.retry_delay = retry_delay;
        }
    }
}
