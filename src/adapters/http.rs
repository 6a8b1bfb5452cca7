use crate::domain::ports::{BodySink, RemoteSource};
use crate::utils::error::{FetchError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// `timeout` bounds a whole request, body included; `None` leaves
    /// requests unbounded.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("sgx-fetch/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    async fn fetch_into(&self, url: &str, sink: &mut dyn BodySink) -> Result<u64> {
        let mut response = self.client.get(url).send().await?;

        tracing::debug!("Response status for {}: {}", url, response.status());

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            sink.write_chunk(&chunk).await?;
            written += chunk.len() as u64;
        }
        Ok(written)
    }
}
