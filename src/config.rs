//! Application Configuration
//!
//! Values baked in at build time through environment variables
//! (`BIZDASH_API_URL=https://... trunk build`), with defaults for local development.

use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_STATS_REFRESH_SECS: u64 = 30;
pub const DEFAULT_STOCK_ALERT_REFRESH_SECS: u64 = 60;
pub const DEFAULT_TOAST_MS: u64 = 3000;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL of the REST API, without trailing slash
    pub api_url: String,
    /// Dashboard background refresh period
    pub stats_refresh: Duration,
    /// Low-stock alert background refresh period
    pub stock_alert_refresh: Duration,
    /// How long a toast stays on screen
    pub toast_duration: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            stats_refresh: Duration::from_secs(DEFAULT_STATS_REFRESH_SECS),
            stock_alert_refresh: Duration::from_secs(DEFAULT_STOCK_ALERT_REFRESH_SECS),
            toast_duration: Duration::from_millis(DEFAULT_TOAST_MS),
        }
    }
}

impl AppConfig {
    /// Configuration captured from the build environment
    pub fn from_build_env() -> Self {
        Self::from_values(
            option_env!("BIZDASH_API_URL"),
            option_env!("BIZDASH_STATS_REFRESH_SECS"),
            option_env!("BIZDASH_STOCK_ALERT_REFRESH_SECS"),
            option_env!("BIZDASH_TOAST_MS"),
        )
    }

    fn from_values(
        api_url: Option<&str>,
        stats_secs: Option<&str>,
        alert_secs: Option<&str>,
        toast_ms: Option<&str>,
    ) -> Self {
        let api_url = api_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string();

        Self {
            api_url,
            stats_refresh: Duration::from_secs(parse_or(
                "BIZDASH_STATS_REFRESH_SECS",
                stats_secs,
                DEFAULT_STATS_REFRESH_SECS,
            )),
            stock_alert_refresh: Duration::from_secs(parse_or(
                "BIZDASH_STOCK_ALERT_REFRESH_SECS",
                alert_secs,
                DEFAULT_STOCK_ALERT_REFRESH_SECS,
            )),
            toast_duration: Duration::from_millis(parse_or(
                "BIZDASH_TOAST_MS",
                toast_ms,
                DEFAULT_TOAST_MS,
            )),
        }
    }
}

fn parse_or(name: &str, raw: Option<&str>, default: u64) -> u64 {
    match raw.map(str::trim) {
        None | Some("") => default,
        Some(value) => match value.parse::<u64>() {
            Ok(0) | Err(_) => {
                tracing::warn!(name, value, default, "invalid config value, using default");
                default
            }
            Ok(parsed) => parsed,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_values(None, None, None, None);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api_url, "http://localhost:5000/api");
        assert_eq!(config.stats_refresh, Duration::from_secs(30));
        assert_eq!(config.stock_alert_refresh, Duration::from_secs(60));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = AppConfig::from_values(Some("https://api.example.com/api/"), None, None, None);
        assert_eq!(config.api_url, "https://api.example.com/api");
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = AppConfig::from_values(None, Some("abc"), Some("0"), Some("1500"));
        assert_eq!(config.stats_refresh, Duration::from_secs(30));
        assert_eq!(config.stock_alert_refresh, Duration::from_secs(60));
        assert_eq!(config.toast_duration, Duration::from_millis(1500));
    }
}
