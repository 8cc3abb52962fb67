use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable consulted for the optional API bearer token.
pub const API_TOKEN_ENV: &str = "MARKETCAST_API_TOKEN";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Which upstream data source the series endpoint should prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourcePref {
    Auto,
    Cache,
    Live,
}

impl SourcePref {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourcePref::Auto => "auto",
            SourcePref::Cache => "cache",
            SourcePref::Live => "live",
        }
    }
}

/// Query parameters sent with every series-lookup request.
#[derive(Debug, Clone)]
pub struct SeriesParams {
    pub horizon_days: u32,
    pub samples: u32,
    pub lookback_days: u32,
    pub source_pref: SourcePref,
}

impl Default for SeriesParams {
    fn default() -> Self {
        Self {
            horizon_days: 5,
            samples: 30,
            lookback_days: 120,
            source_pref: SourcePref::Auto,
        }
    }
}

/// Tuning knobs for the watchlist hydration pipeline.
#[derive(Debug, Clone)]
pub struct HydrationConfig {
    /// Maximum simultaneous in-flight series fetches.
    pub concurrency: usize,
    /// Maximum distinct symbols hydrated per pass.
    pub batch_cap: usize,
    /// Whether a fresh pass re-attempts symbols that failed in an earlier one.
    pub retry_failed: bool,
}

impl Default for HydrationConfig {
    fn default() -> Self {
        Self {
            concurrency: crate::hydrate::SERIES_CONCURRENCY_LIMIT,
            batch_cap: crate::hydrate::WATCHLIST_BATCH_CAP,
            retry_failed: true,
        }
    }
}

/// Connection settings shared by the series fetcher and the API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub timeout_secs: u64,
    pub series: SeriesParams,
    pub hydration: HydrationConfig,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            auth_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            series: SeriesParams::default(),
            hydration: HydrationConfig::default(),
        }
    }

    /// Build a config for `base_url`, picking up the bearer token from the
    /// environment when present.
    pub fn from_env(base_url: impl Into<String>) -> Self {
        let mut config = Self::new(base_url);
        config.auth_token = std::env::var(API_TOKEN_ENV)
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());
        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(AppError::message("API base URL must not be empty"));
        }
        if self.hydration.concurrency == 0 {
            return Err(AppError::message(
                "Hydration concurrency must be at least 1",
            ));
        }
        if self.hydration.batch_cap == 0 {
            return Err(AppError::message("Hydration batch cap must be at least 1"));
        }
        if self.series.samples < 2 {
            return Err(AppError::message(
                "Series sample count must be at least 2 to render a sparkline",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let config = ClientConfig::new("https://api.example.com/");
        assert_eq!(config.base_url, "https://api.example.com");
    }

    #[test]
    fn default_config_is_valid() {
        let config = ClientConfig::new("https://api.example.com");
        config.validate().expect("defaults should validate");
        assert_eq!(config.hydration.concurrency, 2);
        assert_eq!(config.hydration.batch_cap, 10);
        assert!(config.hydration.retry_failed);
    }

    #[test]
    fn rejects_zero_concurrency() {
        let mut config = ClientConfig::new("https://api.example.com");
        config.hydration.concurrency = 0;
        let err = config.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn rejects_single_sample_series() {
        let mut config = ClientConfig::new("https://api.example.com");
        config.series.samples = 1;
        assert!(config.validate().is_err());
    }
}
