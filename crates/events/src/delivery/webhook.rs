//! Generic JSON webhook delivery.
//!
//! [`WebhookDelivery`] POSTs the serialized [`Notification`] to an external
//! URL, retrying with exponential backoff.

use crate::delivery::{http_client, post_with_retry, NotifyError};
use crate::notification::Notification;

/// Delivers notifications to a webhook endpoint.
pub struct WebhookDelivery {
    client: reqwest::Client,
}

impl WebhookDelivery {
    /// Create a new delivery service with a pre-configured HTTP client.
    pub fn new() -> Self {
        Self {
            client: http_client(),
        }
    }

    /// Deliver a notification to `url` with retry.
    pub async fn deliver(&self, url: &str, notification: &Notification) -> Result<(), NotifyError> {
        let payload = serde_json::to_value(notification).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Notification payload not serialisable, sending message only");
            serde_json::json!({
                "outcome": notification.outcome,
                "message": notification.message,
            })
        });
        post_with_retry(&self.client, url, &endpoint_label(url), &payload).await
    }
}

/// Host of `url` for logging. Paths and query strings often carry tokens.
fn endpoint_label(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_owned))
        .unwrap_or_else(|| "webhook".to_owned())
}

impl Default for WebhookDelivery {
    fn default() -> Self {
        Self::new()
    }
}
