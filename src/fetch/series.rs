use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;

use crate::config::{ClientConfig, SeriesParams};
use crate::error::{AppError, Context};
use crate::hydrate::{SeriesFetch, SparkSeries, MIN_SERIES_SAMPLES};

use super::{build_client, FetchResult};

const SERIES_PATH: &str = "/api/series";

/// Envelope returned by the series-lookup endpoint.
#[derive(Debug, Deserialize)]
struct SeriesEnvelope {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    series: Option<SeriesPayload>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SeriesPayload {
    #[serde(default)]
    closes: Vec<f64>,
    // Parallel to `closes`; the sparkline only needs the closes.
    #[serde(default)]
    #[allow(dead_code)]
    dates: Vec<String>,
}

/// HTTP realization of the [`SeriesFetch`] capability.
///
/// One GET per symbol against the remote series-lookup endpoint, with the
/// horizon, sample count, lookback window, and source preference taken from
/// the client config.
pub struct HttpSeriesFetch {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
    params: SeriesParams,
}

impl HttpSeriesFetch {
    pub fn new(config: &ClientConfig) -> FetchResult<Self> {
        config.validate()?;
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            base_url: config.base_url.clone(),
            auth_token: config.auth_token.clone(),
            params: config.series.clone(),
        })
    }

    async fn fetch(&self, symbol: &str) -> FetchResult<Option<SparkSeries>> {
        let url = format!("{}{}", self.base_url, SERIES_PATH);

        let mut request = self.client.get(&url).query(&[
            ("ticker", symbol.to_string()),
            ("horizon_days", self.params.horizon_days.to_string()),
            ("samples", self.params.samples.to_string()),
            ("lookback_days", self.params.lookback_days.to_string()),
            ("source_pref", self.params.source_pref.as_str().to_string()),
        ]);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Series request failed for {}", symbol))?;

        if !response.status().is_success() {
            return Err(AppError::message(format!(
                "Series request for {} failed with status {}",
                symbol,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read series body for {}", symbol))?;

        decode_series_body(&body)
    }
}

impl SeriesFetch for HttpSeriesFetch {
    fn fetch_series<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, FetchResult<Option<SparkSeries>>> {
        Box::pin(self.fetch(symbol))
    }
}

/// Decode the series envelope. `ok:false`, a missing series object, or fewer
/// than two closes all mean "nothing drawable" rather than an error.
fn decode_series_body(body: &str) -> FetchResult<Option<SparkSeries>> {
    let envelope: SeriesEnvelope = serde_json::from_str(body)?;

    if !envelope.ok {
        if let Some(error) = envelope.error {
            log::debug!("series endpoint declined: {}", error);
        }
        return Ok(None);
    }

    let Some(payload) = envelope.series else {
        return Ok(None);
    };
    if payload.closes.len() < MIN_SERIES_SAMPLES {
        return Ok(None);
    }

    Ok(Some(SparkSeries::new(payload.closes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_successful_series_payload() {
        let sample = r#"{
            "ok": true,
            "series": {
                "closes": [100.0, 101.5, 99.25, 102.0],
                "dates": ["2025-08-25", "2025-08-26", "2025-08-27", "2025-08-28"]
            }
        }"#;

        let series = decode_series_body(sample).unwrap().unwrap();
        assert_eq!(series.closes(), &[100.0, 101.5, 99.25, 102.0]);
    }

    #[test]
    fn declined_payload_yields_none() {
        let sample = r#"{"ok": false, "error": "unknown ticker"}"#;
        assert!(decode_series_body(sample).unwrap().is_none());
    }

    #[test]
    fn missing_series_object_yields_none() {
        let sample = r#"{"ok": true}"#;
        assert!(decode_series_body(sample).unwrap().is_none());
    }

    #[test]
    fn short_series_yields_none() {
        let sample = r#"{"ok": true, "series": {"closes": [100.0], "dates": ["2025-08-28"]}}"#;
        assert!(decode_series_body(sample).unwrap().is_none());
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(decode_series_body("not json").is_err());
    }
}
