//! Notification payload describing one archive run.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use arch_copier_core::format::format_bytes;
use arch_copier_core::{ArchiveOutcome, CoreError, DiskUsage, Policy};

/// Coarse result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Skipped,
    Failure,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Skipped => "skipped",
            Self::Failure => "failure",
        }
    }
}

/// Everything a notification channel may want to report.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub outcome: Outcome,
    pub message: String,
    pub source: String,
    pub destination: Option<String>,
    pub policy: Option<Policy>,
    pub deleted_files: Vec<String>,
    pub before: Option<DiskUsage>,
    pub after: Option<DiskUsage>,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    fn base(outcome: Outcome, source: &Path, message: String) -> Self {
        Self {
            outcome,
            message,
            source: source.display().to_string(),
            destination: None,
            policy: None,
            deleted_files: Vec::new(),
            before: None,
            after: None,
            timestamp: Utc::now(),
        }
    }

    /// Describe a completed run.
    pub fn from_outcome(source: &Path, outcome: &ArchiveOutcome) -> Self {
        match outcome {
            ArchiveOutcome::Copied {
                destination,
                bytes,
                report,
                ..
            } => {
                let name = file_name(destination);
                let mut message = format!(
                    "Copied {} as {} ({}), deleted {} file(s)",
                    source.display(),
                    name,
                    format_bytes(*bytes),
                    report.deleted.len()
                );
                if !report.satisfied {
                    message.push_str("; free space requirement not met");
                }

                let mut notification = Self::base(Outcome::Success, source, message);
                notification.destination = Some(destination.display().to_string());
                notification.policy = Some(report.policy);
                notification.deleted_files =
                    report.deleted.iter().map(|e| e.name.clone()).collect();
                notification.before = report.before;
                notification.after = report.after;
                notification
            }
            ArchiveOutcome::Skipped { destination } => {
                let message = format!("File {} already exists. Skipped", file_name(destination));
                let mut notification = Self::base(Outcome::Skipped, source, message);
                notification.destination = Some(destination.display().to_string());
                notification
            }
        }
    }

    /// Describe a run that ended in an error.
    pub fn failure(source: &Path, error: &CoreError) -> Self {
        let message = format!("Archiving {} failed: {error}", source.display());
        Self::base(Outcome::Failure, source, message)
    }

    /// Plain-text rendering for chat channels.
    pub fn render_text(&self) -> String {
        let mut text = format!(
            "[arch-copier] {}\n{}",
            self.outcome.as_str().to_uppercase(),
            self.message
        );
        if let Some(policy) = &self.policy {
            let _ = write!(text, "\nPolicy: {policy}");
        }
        if let Some(before) = &self.before {
            let _ = write!(text, "\nFree before: {}", describe_usage(before));
        }
        if let Some(after) = &self.after {
            let _ = write!(text, "\nFree after: {}", describe_usage(after));
        }
        text
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn describe_usage(usage: &DiskUsage) -> String {
    format!(
        "{} of {} ({:.1}%)",
        format_bytes(usage.free_bytes),
        format_bytes(usage.total_bytes),
        usage.free_percent()
    )
}
