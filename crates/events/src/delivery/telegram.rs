//! Telegram Bot API delivery.
//!
//! Sends the plain-text rendering of a [`Notification`] through
//! `sendMessage`. The bot token is part of the URL, so logs only ever name
//! the chat.

use crate::delivery::{http_client, post_with_retry, NotifyError};
use crate::notification::Notification;

/// Base URL of the Telegram Bot API.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Delivers notifications to a Telegram chat.
pub struct TelegramDelivery {
    client: reqwest::Client,
    api_base: String,
}

impl TelegramDelivery {
    pub fn new() -> Self {
        Self::with_api_base(TELEGRAM_API_BASE)
    }

    /// Point the channel at a different Bot API host (self-hosted servers).
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            api_base: api_base.into(),
        }
    }

    /// `sendMessage` endpoint for `bot_token`.
    pub fn endpoint(&self, bot_token: &str) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            bot_token
        )
    }

    /// Deliver a notification to `chat_id` with retry.
    pub async fn deliver(
        &self,
        bot_token: &str,
        chat_id: &str,
        notification: &Notification,
    ) -> Result<(), NotifyError> {
        let payload = serde_json::json!({
            "chat_id": chat_id,
            "text": notification.render_text(),
            "disable_web_page_preview": true,
        });
        let label = format!("telegram:{chat_id}");
        post_with_retry(&self.client, &self.endpoint(bot_token), &label, &payload).await
    }
}

impl Default for TelegramDelivery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_embeds_token() {
        let delivery = TelegramDelivery::new();
        assert_eq!(
            delivery.endpoint("123:abc"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn custom_api_base_trims_trailing_slash() {
        let delivery = TelegramDelivery::with_api_base("http://localhost:8081/");
        assert_eq!(
            delivery.endpoint("t"),
            "http://localhost:8081/bott/sendMessage"
        );
    }
}
