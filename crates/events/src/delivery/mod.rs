//! External delivery channels for outcome notifications.
//!
//! Both channels POST JSON and share the retry loop below: up to two
//! retries with exponential backoff (1 s, 2 s). The caller bounds the whole
//! exchange with its own timeout.

pub mod telegram;
pub mod webhook;

use std::time::Duration;

/// Retry delays in seconds (exponential backoff: 1s, 2s).
const RETRY_DELAYS_SECS: [u64; 2] = [1, 2];

/// HTTP request timeout for a single delivery attempt.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for notification delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Notification endpoint returned HTTP {0}")]
    HttpStatus(u16),

    /// The whole delivery, retries included, ran past its deadline.
    #[error("Notification timed out after {0:?}")]
    Timeout(Duration),
}

/// Build the shared HTTP client, falling back to reqwest defaults if the
/// configured builder fails.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// POST `payload` to `url`, retrying with backoff before giving up.
///
/// `label` identifies the endpoint in logs without leaking credentials.
pub(crate) async fn post_with_retry(
    client: &reqwest::Client,
    url: &str,
    label: &str,
    payload: &serde_json::Value,
) -> Result<(), NotifyError> {
    for (attempt, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
        match try_send(client, url, payload).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                tracing::warn!(
                    attempt = attempt + 1,
                    endpoint = label,
                    error = %e,
                    "Notification attempt failed, retrying"
                );
                tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
            }
        }
    }

    // Final attempt after the last backoff.
    try_send(client, url, payload).await.inspect_err(|e| {
        tracing::warn!(endpoint = label, error = %e, "Notification failed after all retries");
    })
}

/// Execute a single POST request and check the response status.
async fn try_send(
    client: &reqwest::Client,
    url: &str,
    payload: &serde_json::Value,
) -> Result<(), NotifyError> {
    let response = client
        .post(url)
        .json(payload)
        .send()
        .await
        .map_err(|e| NotifyError::Request(e.without_url()))?;
    if !response.status().is_success() {
        return Err(NotifyError::HttpStatus(response.status().as_u16()));
    }
    Ok(())
}
