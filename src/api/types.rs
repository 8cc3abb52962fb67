use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::SourcePref;

/// Alert trigger confidence tiers, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "LOW",
            Confidence::Medium => "MEDIUM",
            Confidence::High => "HIGH",
        }
    }
}

/// One row of the prediction board.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionRow {
    pub ticker: Option<String>,
    pub prob_up: Option<f64>,
    pub direction: Option<String>,
    pub asof: Option<DateTime<Utc>>,
}

/// Payload of `GET /api/summary`. Fields default so a partially built
/// summary on the backend still decodes.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryResponse {
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub system_status: Option<String>,
    #[serde(default)]
    pub kill_switch: Value,
    #[serde(default)]
    pub predictions: Vec<PredictionRow>,
}

/// One headline from `GET /api/news`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsItem {
    pub title: Option<String>,
    pub url: Option<String>,
    pub domain: Option<String>,
    #[serde(rename = "seenDate")]
    pub seen_date: Option<String>,
    #[serde(rename = "socialImage")]
    pub social_image: Option<String>,
    #[serde(rename = "sourceCountry")]
    pub source_country: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsResponse {
    pub ticker: String,
    pub days: u32,
    pub limit: u32,
    #[serde(default)]
    pub items: Vec<NewsItem>,
}

/// Body for `POST /api/alerts/subscribe`.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeRequest {
    pub email: String,
    pub enabled: bool,
    pub tickers: Vec<String>,
    pub min_prob_up: f64,
    pub min_confidence: Confidence,
    pub horizon_days: u32,
    pub source_pref: SourcePref,
    pub cooldown_minutes: u32,
}

impl SubscribeRequest {
    /// Backend defaults: 0.65 probability floor, MEDIUM confidence, 5-day
    /// horizon, 6-hour cooldown.
    pub fn new(email: impl Into<String>, tickers: Vec<String>) -> Self {
        Self {
            email: email.into(),
            enabled: true,
            tickers,
            min_prob_up: 0.65,
            min_confidence: Confidence::Medium,
            horizon_days: 5,
            source_pref: SourcePref::Auto,
            cooldown_minutes: 360,
        }
    }
}

/// Stored subscription as echoed back by the alerts endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertSubscription {
    pub email: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    /// Comma-joined on the wire.
    pub tickers: Option<String>,
    #[serde(default)]
    pub tickers_list: Vec<String>,
    pub min_prob_up: Option<f64>,
    pub min_confidence: Option<String>,
    pub horizon_days: Option<u32>,
    pub source_pref: Option<String>,
    pub cooldown_minutes: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionResponse {
    pub ok: bool,
    #[serde(default)]
    pub subscription: Option<AlertSubscription>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One fired alert, kept loose: the backend stores engine output verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertEvent {
    pub ticker: Option<String>,
    pub prob_up: Option<f64>,
    #[serde(flatten)]
    pub extra: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlertEventsResponse {
    pub ok: bool,
    pub email: Option<String>,
    #[serde(default)]
    pub returned: usize,
    #[serde(default)]
    pub events: Vec<AlertEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_summary_payload() {
        let sample = r#"{
            "generated_at": "2025-08-28T21:00:00Z",
            "system_status": "OK",
            "kill_switch": {"active": "false"},
            "predictions": [
                {"ticker": "SPY", "prob_up": 0.71, "direction": "UP", "asof": "2025-08-28T20:55:00Z"},
                {"ticker": "QQQ", "prob_up": 0.44, "direction": "DOWN", "asof": null}
            ]
        }"#;

        let summary: SummaryResponse = serde_json::from_str(sample).unwrap();
        assert_eq!(summary.system_status.as_deref(), Some("OK"));
        assert_eq!(summary.predictions.len(), 2);
        assert_eq!(summary.predictions[0].ticker.as_deref(), Some("SPY"));
        assert!(summary.predictions[1].asof.is_none());
    }

    #[test]
    fn parses_sparse_summary_payload() {
        let summary: SummaryResponse = serde_json::from_str("{}").unwrap();
        assert!(summary.generated_at.is_none());
        assert!(summary.predictions.is_empty());
    }

    #[test]
    fn parses_news_payload() {
        let sample = r#"{
            "ticker": "TSLA",
            "days": 7,
            "limit": 20,
            "items": [
                {
                    "title": "Deliveries beat estimates",
                    "url": "https://example.com/a",
                    "domain": "example.com",
                    "seenDate": "20250828T120000Z",
                    "socialImage": null,
                    "sourceCountry": "US",
                    "language": "English"
                }
            ]
        }"#;

        let news: NewsResponse = serde_json::from_str(sample).unwrap();
        assert_eq!(news.ticker, "TSLA");
        assert_eq!(news.items.len(), 1);
        assert_eq!(news.items[0].domain.as_deref(), Some("example.com"));
        assert_eq!(news.items[0].seen_date.as_deref(), Some("20250828T120000Z"));
    }

    #[test]
    fn subscribe_request_serializes_enums_as_wire_strings() {
        let request = SubscribeRequest::new("user@example.com", vec!["SPY".into(), "QQQ".into()]);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["min_confidence"], "MEDIUM");
        assert_eq!(json["source_pref"], "auto");
        assert_eq!(json["cooldown_minutes"], 360);
    }

    #[test]
    fn parses_subscription_envelope_with_error() {
        let sample = r#"{"ok": false, "error": "Not found"}"#;
        let response: SubscriptionResponse = serde_json::from_str(sample).unwrap();
        assert!(!response.ok);
        assert_eq!(response.error.as_deref(), Some("Not found"));
        assert!(response.subscription.is_none());
    }

    #[test]
    fn parses_alert_events_with_extra_fields() {
        let sample = r#"{
            "ok": true,
            "email": "user@example.com",
            "returned": 1,
            "events": [
                {"ticker": "SPY", "prob_up": 0.7, "confidence": "HIGH", "sent_at": "2025-08-28T12:00:00Z"}
            ]
        }"#;

        let response: AlertEventsResponse = serde_json::from_str(sample).unwrap();
        assert_eq!(response.returned, 1);
        assert_eq!(response.events[0].ticker.as_deref(), Some("SPY"));
        assert_eq!(response.events[0].extra["confidence"], "HIGH");
    }
}
