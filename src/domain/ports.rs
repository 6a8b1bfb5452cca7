use crate::domain::model::FetchEvent;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Receives a download body chunk by chunk.
#[async_trait]
pub trait BodySink: Send {
    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()>;
}

#[async_trait]
impl BodySink for Vec<u8> {
    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.extend_from_slice(chunk);
        Ok(())
    }
}

/// Destination of downloads. A body is written to a staged entry first and
/// only appears at its final path once committed.
pub trait Storage: Send + Sync {
    type Staged: BodySink + 'static;

    fn ensure_dir(&self, dir: &Path) -> impl std::future::Future<Output = Result<()>> + Send;
    fn stage(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<Self::Staged>> + Send;
    /// Fails when the staged body is not a readable zip archive.
    fn check_archive(
        &self,
        staged: &mut Self::Staged,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn commit(&self, staged: Self::Staged) -> impl std::future::Future<Output = Result<()>> + Send;
    fn discard(&self, staged: Self::Staged) -> impl std::future::Future<Output = ()> + Send;
}

/// Where the files are downloaded from.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Streams the body of `url` into `sink` and returns the number of bytes.
    async fn fetch_into(&self, url: &str, sink: &mut dyn BodySink) -> Result<u64>;
}

/// Sink for the structured events of a run.
pub trait FetchObserver: Send + Sync {
    fn on_event(&self, event: &FetchEvent);
}
