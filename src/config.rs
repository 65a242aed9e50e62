use std::env;
use std::time::Duration;

pub const DEFAULT_MAGNETIC_FEED_URL: &str =
    "https://services.swpc.noaa.gov/products/solar-wind/mag-6-hour.json";
pub const DEFAULT_PLASMA_FEED_URL: &str =
    "https://services.swpc.noaa.gov/products/solar-wind/plasma-6-hour.json";

/// One day. The feeds only cover the last six hours, so longer periods are useless.
pub const MAX_FETCH_INTERVAL_MINUTES: u64 = 24 * 60;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be greater than zero")]
    NotPositive { name: &'static str },
    #[error("{name} must be at most {max}")]
    TooLarge { name: &'static str, max: u64 },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub magnetic_feed_url: String,
    pub plasma_feed_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub fetch_interval_minutes: u64,
    pub http_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Config {
            magnetic_feed_url: env::var("MAG_FEED_URL")
                .unwrap_or_else(|_| DEFAULT_MAGNETIC_FEED_URL.to_string()),
            plasma_feed_url: env::var("PLASMA_FEED_URL")
                .unwrap_or_else(|_| DEFAULT_PLASMA_FEED_URL.to_string()),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            fetch_interval_minutes: env::var("FETCH_INTERVAL_MINUTES")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            http_timeout_seconds: env::var("HTTP_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
        };

        // A zero period would make tokio's interval panic
        if config.fetch_interval_minutes == 0 {
            return Err(ConfigError::NotPositive {
                name: "FETCH_INTERVAL_MINUTES",
            });
        }
        if config.fetch_interval_minutes > MAX_FETCH_INTERVAL_MINUTES {
            return Err(ConfigError::TooLarge {
                name: "FETCH_INTERVAL_MINUTES",
                max: MAX_FETCH_INTERVAL_MINUTES,
            });
        }
        if config.http_timeout_seconds == 0 {
            return Err(ConfigError::NotPositive {
                name: "HTTP_TIMEOUT_SECONDS",
            });
        }

        Ok(config)
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }
}
