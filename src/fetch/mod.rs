use std::time::Duration;

use reqwest::Client;

use crate::error::{Context, Result};

pub mod series;

pub use series::HttpSeriesFetch;

pub type FetchResult<T> = Result<T>;

/// Shared HTTP client builder used by the series fetcher and the API client.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("Failed to construct HTTP client")?)
}
