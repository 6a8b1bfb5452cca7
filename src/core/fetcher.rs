use crate::domain::model::{DownloadOutcome, DownloadStatus, DownloadTarget, FetchEvent};
use crate::domain::ports::{FetchObserver, RemoteSource, Storage};
use crate::utils::error::Result;
use std::io::{Read, Seek};
use std::sync::Arc;
use std::time::Duration;

const MAX_BACKOFF: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Re-attempts after the first try.
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before re-attempt number `retry` (1-based): `retry_delay * 2^(retry-1)`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.retry_delay.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

pub struct Fetcher<S: Storage, R: RemoteSource> {
    storage: S,
    source: R,
    policy: RetryPolicy,
    observer: Arc<dyn FetchObserver>,
}

impl<S: Storage, R: RemoteSource> Fetcher<S, R> {
    pub fn new(storage: S, source: R, policy: RetryPolicy, observer: Arc<dyn FetchObserver>) -> Self {
        Self {
            storage,
            source,
            policy,
            observer,
        }
    }

    /// Downloads every target in order. A failed target never stops the rest.
    pub async fn fetch_all(&self, targets: &[DownloadTarget]) -> Vec<DownloadOutcome> {
        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            outcomes.push(self.download_file(target).await);
        }
        outcomes
    }

    /// Downloads one target, retrying transient failures per the policy.
    ///
    /// Failures are reported through the observer and the returned outcome,
    /// never as an error.
    pub async fn download_file(&self, target: &DownloadTarget) -> DownloadOutcome {
        if let Err(e) = self.storage.ensure_dir(&target.folder).await {
            return self.failed(target, 0, e.to_string());
        }

        let max_attempts = self.policy.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            tracing::debug!("GET {} (attempt {}/{})", target.url, attempt, max_attempts);

            match self.transfer(target).await {
                Ok(bytes) => {
                    self.observer.on_event(&FetchEvent::Downloaded {
                        file_name: target.file_name.clone(),
                        destination_path: target.destination_path.clone(),
                        bytes,
                        attempts: attempt,
                    });
                    return DownloadOutcome {
                        file_name: target.file_name.clone(),
                        destination_path: target.destination_path.clone(),
                        attempts: attempt,
                        status: DownloadStatus::Saved { bytes },
                    };
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let retry_in = self.policy.backoff(attempt);
                    self.observer.on_event(&FetchEvent::AttemptFailed {
                        file_name: target.file_name.clone(),
                        attempt,
                        max_attempts,
                        error: e.to_string(),
                        retry_in,
                    });
                    tokio::time::sleep(retry_in).await;
                }
                Err(e) => return self.failed(target, attempt, e.to_string()),
            }
        }
    }

    async fn transfer(&self, target: &DownloadTarget) -> Result<u64> {
        let mut staged = self.storage.stage(&target.destination_path).await?;

        match self.receive(target, &mut staged).await {
            Ok(bytes) => {
                self.storage.commit(staged).await?;
                Ok(bytes)
            }
            Err(e) => {
                self.storage.discard(staged).await;
                Err(e)
            }
        }
    }

    async fn receive(&self, target: &DownloadTarget, staged: &mut S::Staged) -> Result<u64> {
        let bytes = self.source.fetch_into(&target.url, &mut *staged).await?;
        if target.is_archive() {
            self.storage.check_archive(staged).await?;
        }
        Ok(bytes)
    }

    fn failed(&self, target: &DownloadTarget, attempts: u32, error: String) -> DownloadOutcome {
        self.observer.on_event(&FetchEvent::Failed {
            file_name: target.file_name.clone(),
            attempts,
            error: error.clone(),
        });
        DownloadOutcome {
            file_name: target.file_name.clone(),
            destination_path: target.destination_path.clone(),
            attempts,
            status: DownloadStatus::Failed { error },
        }
    }
}

/// Rejects bodies that are not zip archives, e.g. an HTML error page served with 200.
pub fn verify_archive<R: Read + Seek>(body: R) -> Result<()> {
    zip::ZipArchive::new(body)?;
    Ok(())
}
