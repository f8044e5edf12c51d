use std::time::Duration;

use tracing::info;

use crate::error::ExportError;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Blocking HTTP acquirer for agency feed archives. Feeds are small enough
/// (tens of megabytes) to hold in memory for the duration of one agency's
/// processing.
pub struct FeedFetcher {
    client: reqwest::blocking::Client,
}

impl FeedFetcher {
    pub fn new(timeout: Duration) -> Result<Self, ExportError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(format!("gtfs-atlas/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(ExportError::HttpClient)?;
        Ok(Self { client })
    }

    /// Fetch a feed archive into memory. Timeout expiry and non-2xx statuses
    /// are acquisition failures, fatal to the whole run.
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>, ExportError> {
        let acquire = |source| ExportError::Acquire {
            url: url.to_string(),
            source,
        };
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(acquire)?;
        let bytes = response.bytes().map_err(acquire)?;
        info!("fetched {} bytes from {url}", bytes.len());
        Ok(bytes.to_vec())
    }
}
