//! Channel selection and best-effort delivery.

use std::time::Duration;

use crate::delivery::telegram::TelegramDelivery;
use crate::delivery::webhook::WebhookDelivery;
use crate::delivery::NotifyError;
use crate::notification::Notification;

/// Default upper bound for one delivery, retries included.
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

/// Where notifications go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyTarget {
    Webhook { url: String },
    Telegram { bot_token: String, chat_id: String },
}

/// Notification settings resolved from flags and the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyConfig {
    /// `None` disables notifications.
    pub target: Option<NotifyTarget>,
    pub timeout: Duration,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            target: None,
            timeout: Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECS),
        }
    }
}

impl NotifyConfig {
    /// Pick a channel from the optional settings.
    ///
    /// A webhook URL wins over Telegram. Telegram needs both a token and a
    /// chat id; a lone half is ignored with a warning. Blank values count as
    /// unset.
    pub fn from_parts(
        webhook_url: Option<String>,
        telegram_token: Option<String>,
        telegram_chat_id: Option<String>,
        timeout_secs: u64,
    ) -> Self {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let webhook_url = non_blank(webhook_url);
        let telegram_token = non_blank(telegram_token);
        let telegram_chat_id = non_blank(telegram_chat_id);

        let target = match (webhook_url, telegram_token, telegram_chat_id) {
            (Some(url), _, _) => Some(NotifyTarget::Webhook { url }),
            (None, Some(bot_token), Some(chat_id)) => Some(NotifyTarget::Telegram { bot_token, chat_id }),
            (None, Some(_), None) | (None, None, Some(_)) => {
                tracing::warn!("Telegram notifications need both a bot token and a chat id");
                None
            }
            (None, None, None) => None,
        };

        Self {
            target,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// Sends notifications to the configured channel.
pub struct Notifier {
    target: NotifyTarget,
    timeout: Duration,
    webhook: WebhookDelivery,
    telegram: TelegramDelivery,
}

impl Notifier {
    /// Build a notifier, or `None` when no channel is configured.
    pub fn from_config(config: &NotifyConfig) -> Option<Self> {
        let target = config.target.clone()?;
        Some(Self {
            target,
            timeout: config.timeout,
            webhook: WebhookDelivery::new(),
            telegram: TelegramDelivery::new(),
        })
    }

    pub fn target(&self) -> &NotifyTarget {
        &self.target
    }

    /// Deliver `notification`, bounded by the configured timeout.
    pub async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let delivery = async {
            match &self.target {
                NotifyTarget::Webhook { url } => self.webhook.deliver(url, notification).await,
                NotifyTarget::Telegram { bot_token, chat_id } => {
                    self.telegram.deliver(bot_token, chat_id, notification).await
                }
            }
        };

        tokio::time::timeout(self.timeout, delivery)
            .await
            .map_err(|_| NotifyError::Timeout(self.timeout))?
    }

    /// Deliver `notification` and discard any failure after logging it.
    pub async fn notify_best_effort(&self, notification: &Notification) {
        match self.notify(notification).await {
            Ok(()) => {
                tracing::debug!(outcome = notification.outcome.as_str(), "Notification delivered");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Notification failed, ignoring");
            }
        }
    }
}
