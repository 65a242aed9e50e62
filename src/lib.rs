pub mod aggregator;
pub mod api;
pub mod app;
pub mod config;
pub mod cycle_error;
pub mod display;
pub mod fetch_error;
pub mod fetcher;
pub mod models;
pub mod monitor;
pub mod scheduler;
pub mod sinks;
pub mod stats;
pub mod table;
