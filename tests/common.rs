// Shared fixtures for integration tests: SWPC-shaped payloads and in-memory
// feed sources.

use space_weather_monitor::fetch_error::FetchError;
use space_weather_monitor::fetcher::{decode_table, FeedSource};
use space_weather_monitor::models::Feed;
use space_weather_monitor::table::RawTable;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

pub const MAG_JSON: &str = r#"[
    ["time_tag","bx_gsm","by_gsm","bz_gsm","lon_gsm","lat_gsm","bt"],
    ["2025-10-14 12:00:00.000","2.10","-3.40","-2.00","301.55","-26.10","4.50"],
    ["2025-10-14 12:01:00.000","2.20","-3.10","3.00","305.12","30.02","5.50"],
    ["2025-10-14 12:02:00.000",null,null,null,null,null,null],
    ["2025-10-14 12:03:00.000","2.00","-3.00","-1.00","300.00","-10.00","5.00"],
    ["2025-10-14 12:04:00.000","1.90","-2.90","0.00","299.10","0.00","5.00"]
]"#;

pub const PLASMA_JSON: &str = r#"[
    ["time_tag","density","speed","temperature"],
    ["2025-10-14 12:00:00.000","3.10","410.2","98000"],
    ["2025-10-14 12:01:00.000","2.90","431.8","101000"],
    ["2025-10-14 12:05:00.000","0.07","452.6","99000"]
]"#;

pub fn mag_table() -> RawTable {
    decode_table(MAG_JSON).expect("fixture decodes")
}

pub fn plasma_table() -> RawTable {
    decode_table(PLASMA_JSON).expect("fixture decodes")
}

/// Serves fixed tables; a missing table fails like an HTTP 503.
#[derive(Clone)]
pub struct StaticSource {
    pub magnetic: Option<RawTable>,
    pub plasma: Option<RawTable>,
}

impl StaticSource {
    pub fn healthy() -> Self {
        Self {
            magnetic: Some(mag_table()),
            plasma: Some(plasma_table()),
        }
    }
}

impl FeedSource for StaticSource {
    async fn fetch_table(&self, feed: Feed) -> Result<RawTable, FetchError> {
        let table = match feed {
            Feed::Magnetic => self.magnetic.clone(),
            Feed::Plasma => self.plasma.clone(),
        };
        table.ok_or_else(|| FetchError::Status {
            url: format!("static://{feed}"),
            status: 503,
        })
    }
}

/// Holds every fetch until `release` hands out a permit.
pub struct GatedSource {
    pub inner: StaticSource,
    pub release: Arc<Semaphore>,
}

impl FeedSource for GatedSource {
    async fn fetch_table(&self, feed: Feed) -> Result<RawTable, FetchError> {
        let _permit = self.release.acquire().await.expect("semaphore open");
        self.inner.fetch_table(feed).await
    }
}

/// Healthy source whose magnetic feed can be switched off between cycles.
pub struct FlakySource {
    pub inner: StaticSource,
    pub magnetic_down: AtomicBool,
}

impl FlakySource {
    pub fn new() -> Self {
        Self {
            inner: StaticSource::healthy(),
            magnetic_down: AtomicBool::new(false),
        }
    }

    pub fn take_magnetic_down(&self) {
        self.magnetic_down.store(true, Ordering::SeqCst);
    }
}

impl FeedSource for FlakySource {
    async fn fetch_table(&self, feed: Feed) -> Result<RawTable, FetchError> {
        if feed == Feed::Magnetic && self.magnetic_down.load(Ordering::SeqCst) {
            return Err(FetchError::Status {
                url: "static://magnetic".to_string(),
                status: 502,
            });
        }
        self.inner.fetch_table(feed).await
    }
}
