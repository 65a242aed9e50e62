use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::fetch_error::FetchError;
use crate::models::Feed;
use crate::table::RawTable;

/// Anything that can hand the monitor a raw table for a feed.
pub trait FeedSource: Send + Sync {
    fn fetch_table(
        &self,
        feed: Feed,
    ) -> impl Future<Output = Result<RawTable, FetchError>> + Send;
}

/// HTTP source for the SWPC solar-wind JSON products.
#[derive(Clone)]
pub struct SwpcFetcher {
    client: reqwest::Client,
    magnetic_url: String,
    plasma_url: String,
}

impl SwpcFetcher {
    pub fn new(
        magnetic_url: String,
        plasma_url: String,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            magnetic_url,
            plasma_url,
        })
    }

    pub fn url(&self, feed: Feed) -> &str {
        match feed {
            Feed::Magnetic => &self.magnetic_url,
            Feed::Plasma => &self.plasma_url,
        }
    }

    #[instrument(skip(self), fields(url = %self.url(feed)))]
    async fn fetch(&self, feed: Feed) -> Result<RawTable, FetchError> {
        let url = self.url(feed);
        debug!("Sending HTTP request for {} feed", feed);
        let response = self.client.get(url).send().await?;
        debug!("Received HTTP response with status: {}", response.status());

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        debug!("Retrieved feed content, size: {} bytes", body.len());

        decode_table(&body)
    }
}

impl FeedSource for SwpcFetcher {
    fn fetch_table(
        &self,
        feed: Feed,
    ) -> impl Future<Output = Result<RawTable, FetchError>> + Send {
        self.fetch(feed)
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Decode a JSON array-of-arrays payload into a [`RawTable`].
///
/// `null` cells become empty strings and numbers keep their JSON text, so the
/// table parser sees every cell the same way.
pub fn decode_table(body: &str) -> Result<RawTable, FetchError> {
    let value: Value = serde_json::from_str(body)?;
    let rows = value
        .as_array()
        .ok_or_else(|| FetchError::NotATable("top-level value is not an array".to_string()))?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            row.as_array()
                .map(|cells| cells.iter().map(cell_text).collect())
                .ok_or_else(|| FetchError::NotATable(format!("row {i} is not an array")))
        })
        .collect()
}
