pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliArgs;

pub use crate::adapters::{http::HttpSource, storage::LocalStorage};
pub use crate::config::toml_config::FetchConfig;
pub use crate::core::engine::{EngineSettings, FetchEngine, FetchPlan};
pub use crate::domain::model::{DateRequest, FetchReport};
pub use crate::utils::error::{FetchError, Result};
