use crate::core::calendar;
use crate::core::fetcher::{Fetcher, RetryPolicy};
use crate::core::targets::build_targets;
use crate::domain::model::{
    DateRequest, DateSource, DownloadTarget, FetchEvent, FetchReport, KeyAnchor, RequestDate,
    ResourceKey,
};
use crate::domain::ports::{FetchObserver, RemoteSource, Storage};
use crate::utils::error::Result;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;

/// Inputs the engine needs, already validated.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub api_url: String,
    pub folder_path_base: PathBuf,
    pub anchor: KeyAnchor,
    pub retry: RetryPolicy,
}

/// What a run would download, without touching the network.
#[derive(Debug, Clone)]
pub struct FetchPlan {
    pub date: RequestDate,
    pub key: ResourceKey,
    pub targets: Vec<DownloadTarget>,
}

pub struct FetchEngine<S: Storage, R: RemoteSource> {
    settings: EngineSettings,
    fetcher: Fetcher<S, R>,
    observer: Arc<dyn FetchObserver>,
}

impl<S: Storage, R: RemoteSource> FetchEngine<S, R> {
    pub fn new(settings: EngineSettings, storage: S, source: R, observer: Arc<dyn FetchObserver>) -> Self {
        let fetcher = Fetcher::new(storage, source, settings.retry, observer.clone());
        Self {
            settings,
            fetcher,
            observer,
        }
    }

    /// Resolves the date and key and builds the targets.
    ///
    /// Fails only when the date is a weekend day.
    pub fn plan(&self, request: DateRequest, today: NaiveDate) -> Result<FetchPlan> {
        let date = calendar::resolve(request, today)?;

        if date.source == DateSource::RolledBackToFriday {
            self.observer.on_event(&FetchEvent::DateRolledBack {
                today,
                resolved: date.date,
            });
        }
        if calendar::is_unpublished(date.date, today) {
            self.observer.on_event(&FetchEvent::FutureDate {
                date: date.date,
                today,
            });
        }

        let key = calendar::resource_key(&self.settings.anchor, date.date);
        self.observer.on_event(&FetchEvent::KeyResolved {
            date: date.date,
            key,
        });

        let targets = build_targets(
            &self.settings.api_url,
            key,
            &date,
            &self.settings.folder_path_base,
        );

        Ok(FetchPlan { date, key, targets })
    }

    /// Plans the run and downloads every target. Download failures end up in
    /// the report, not in the error.
    pub async fn run(&self, request: DateRequest, today: NaiveDate) -> Result<FetchReport> {
        let plan = self.plan(request, today)?;
        let outcomes = self.fetcher.fetch_all(&plan.targets).await;

        Ok(FetchReport {
            date: plan.date,
            key: plan.key,
            outcomes,
        })
    }
}
