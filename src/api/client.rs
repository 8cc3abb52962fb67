use reqwest::{Client, RequestBuilder};

use crate::config::ClientConfig;
use crate::error::{AppError, Context, Result};
use crate::fetch::build_client;
use crate::symbol::normalize_symbol;

use super::types::{
    AlertEventsResponse, AlertSubscription, NewsResponse, SubscribeRequest, SubscriptionResponse,
    SummaryResponse,
};

const SUMMARY_PATH: &str = "/api/summary";
const NEWS_PATH: &str = "/api/news";
const ALERTS_SUBSCRIBE_PATH: &str = "/api/alerts/subscribe";
const ALERTS_SUBSCRIPTION_PATH: &str = "/api/alerts/subscription";
const ALERTS_EVENTS_PATH: &str = "/api/alerts/events";

/// Typed wrapper over the prediction service's mobile endpoints.
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            base_url: config.base_url.clone(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Latest prediction board plus backend health metadata.
    pub async fn fetch_summary(&self) -> Result<SummaryResponse> {
        let response = self
            .authorize(self.client.get(self.url(SUMMARY_PATH)))
            .send()
            .await
            .context("Summary request failed")?
            .error_for_status()
            .context("Summary request returned error status")?;

        Ok(response
            .json()
            .await
            .context("Failed to parse summary response")?)
    }

    /// Recent headlines for one ticker. `days` and `limit` are clamped to the
    /// backend's accepted ranges (1-30 and 1-50).
    pub async fn fetch_news(&self, ticker: &str, days: u32, limit: u32) -> Result<NewsResponse> {
        let ticker = normalize_symbol(ticker);
        if ticker.is_empty() {
            return Err(AppError::message("News lookup requires a ticker"));
        }
        let days = days.clamp(1, 30);
        let limit = limit.clamp(1, 50);

        let response = self
            .authorize(self.client.get(self.url(NEWS_PATH)).query(&[
                ("ticker", ticker.clone()),
                ("days", days.to_string()),
                ("limit", limit.to_string()),
            ]))
            .send()
            .await
            .with_context(|| format!("News request failed for {}", ticker))?
            .error_for_status()
            .with_context(|| format!("News request returned error status for {}", ticker))?;

        Ok(response
            .json()
            .await
            .context("Failed to parse news response")?)
    }

    /// Create or update the alert subscription for `request.email`.
    pub async fn subscribe_alerts(&self, request: &SubscribeRequest) -> Result<AlertSubscription> {
        if request.tickers.is_empty() {
            return Err(AppError::message(
                "Alert subscription requires at least one ticker (up to 10)",
            ));
        }

        let response = self
            .authorize(self.client.post(self.url(ALERTS_SUBSCRIBE_PATH)))
            .json(request)
            .send()
            .await
            .context("Alert subscribe request failed")?
            .error_for_status()
            .context("Alert subscribe request returned error status")?;

        let envelope: SubscriptionResponse = response
            .json()
            .await
            .context("Failed to parse alert subscribe response")?;

        unwrap_subscription(envelope)
    }

    /// Look up the stored subscription for an email address.
    pub async fn fetch_subscription(&self, email: &str) -> Result<AlertSubscription> {
        let response = self
            .authorize(
                self.client
                    .get(self.url(ALERTS_SUBSCRIPTION_PATH))
                    .query(&[("email", email)]),
            )
            .send()
            .await
            .context("Subscription lookup failed")?
            .error_for_status()
            .context("Subscription lookup returned error status")?;

        let envelope: SubscriptionResponse = response
            .json()
            .await
            .context("Failed to parse subscription response")?;

        unwrap_subscription(envelope)
    }

    /// Alert history for an email address, newest first. `limit` is clamped
    /// to the backend's 1-2000 range.
    pub async fn fetch_alert_events(
        &self,
        email: &str,
        limit: u32,
    ) -> Result<AlertEventsResponse> {
        let limit = limit.clamp(1, 2000);

        let response = self
            .authorize(
                self.client
                    .get(self.url(ALERTS_EVENTS_PATH))
                    .query(&[("email", email.to_string()), ("limit", limit.to_string())]),
            )
            .send()
            .await
            .context("Alert events request failed")?
            .error_for_status()
            .context("Alert events request returned error status")?;

        let envelope: AlertEventsResponse = response
            .json()
            .await
            .context("Failed to parse alert events response")?;

        if !envelope.ok {
            return Err(AppError::message("Alert events request was rejected"));
        }
        Ok(envelope)
    }
}

fn unwrap_subscription(envelope: SubscriptionResponse) -> Result<AlertSubscription> {
    if !envelope.ok {
        return Err(AppError::message(
            envelope
                .error
                .unwrap_or_else(|| "Alerts endpoint rejected the request".to_string()),
        ));
    }
    envelope
        .subscription
        .ok_or_else(|| AppError::message("Alerts endpoint returned no subscription"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwrap_subscription_surfaces_backend_error() {
        let envelope = SubscriptionResponse {
            ok: false,
            subscription: None,
            error: Some("Not found".to_string()),
        };
        let err = unwrap_subscription(envelope).expect_err("should fail");
        assert_eq!(err.to_string(), "Not found");
    }

    #[test]
    fn unwrap_subscription_requires_a_body() {
        let envelope = SubscriptionResponse {
            ok: true,
            subscription: None,
            error: None,
        };
        assert!(unwrap_subscription(envelope).is_err());
    }
}
