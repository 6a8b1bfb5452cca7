pub mod calendar;
pub mod engine;
pub mod fetcher;
pub mod targets;

pub use crate::domain::model::{DownloadOutcome, DownloadTarget, FetchEvent, FetchReport};
pub use crate::domain::ports::{FetchObserver, RemoteSource, Storage};
pub use crate::utils::error::Result;
