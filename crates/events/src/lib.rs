//! Outcome notifications for `arch-copier`.
//!
//! - [`Notification`] — what happened, plus before/after disk statistics.
//! - [`delivery`] — external channels (webhook, Telegram).
//! - [`Notifier`] — picks the configured channel and delivers with a bounded
//!   timeout. [`Notifier::notify_best_effort`] never fails the caller.

pub mod delivery;
pub mod notification;
pub mod notifier;

pub use delivery::telegram::TelegramDelivery;
pub use delivery::webhook::WebhookDelivery;
pub use delivery::NotifyError;
pub use notification::{Notification, Outcome};
pub use notifier::{NotifyConfig, NotifyTarget, Notifier};
