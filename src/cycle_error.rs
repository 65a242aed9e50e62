use serde::Serialize;

use crate::fetch_error::FetchError;
use crate::models::Feed;
use crate::table::TableError;

/// Why a refresh cycle produced no snapshot.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("Failed to retrieve {feed} feed: {source}")]
    Transport { feed: Feed, source: FetchError },
    #[error("Unexpected {feed} feed format: {source}")]
    Schema { feed: Feed, source: TableError },
    #[error("No usable {feed} data: {source}")]
    EmptyData { feed: Feed, source: TableError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Transport,
    Schema,
    EmptyData,
}

impl CycleError {
    pub fn from_table(feed: Feed, source: TableError) -> Self {
        if source.is_schema() {
            CycleError::Schema { feed, source }
        } else {
            CycleError::EmptyData { feed, source }
        }
    }

    pub fn feed(&self) -> Feed {
        match self {
            CycleError::Transport { feed, .. }
            | CycleError::Schema { feed, .. }
            | CycleError::EmptyData { feed, .. } => *feed,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CycleError::Transport { .. } => ErrorCategory::Transport,
            CycleError::Schema { .. } => ErrorCategory::Schema,
            CycleError::EmptyData { .. } => ErrorCategory::EmptyData,
        }
    }

    /// Short text shown in place of the current readings.
    pub fn user_message(&self) -> String {
        match self {
            CycleError::Transport { .. } => "Error loading data".to_string(),
            CycleError::Schema { feed, .. } => format!("Unexpected {feed} data format"),
            CycleError::EmptyData { feed, .. } => format!("No {feed} data available"),
        }
    }
}
