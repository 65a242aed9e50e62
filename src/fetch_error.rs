#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Feed returned HTTP {status}: {url}")]
    Status { url: String, status: u16 },
    #[error("Failed to decode feed JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Feed payload is not a table: {0}")]
    NotATable(String),
}
