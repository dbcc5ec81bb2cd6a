//! `arch-copier` library crate.
//!
//! Holds the argument model and the run loop so both can be exercised from
//! integration tests. The binary entrypoint lives in `main.rs`.
//!
//! # Environment variables
//!
//! | Variable                          | Default | Description                          |
//! |-----------------------------------|---------|--------------------------------------|
//! | `ARCH_COPIER_WEBHOOK_URL`         | --      | JSON webhook for outcome reports     |
//! | `ARCH_COPIER_TELEGRAM_TOKEN`      | --      | Telegram bot token                   |
//! | `ARCH_COPIER_TELEGRAM_CHAT_ID`    | --      | Telegram chat to notify              |
//! | `ARCH_COPIER_NOTIFY_TIMEOUT_SECS` | `10`    | Upper bound for one notification     |
//! | `RUST_LOG`                        | `info`  | Log filter                           |

use std::path::PathBuf;

use chrono::Local;
use clap::error::ErrorKind;
use clap::{value_parser, ArgGroup, CommandFactory, Parser};

use arch_copier_core::{archive, ArchiveOutcome, ArchiveRequest, CoreError, Policy, StatvfsProbe};
use arch_copier_events::notifier::DEFAULT_NOTIFY_TIMEOUT_SECS;
use arch_copier_events::{Notification, Notifier, NotifyConfig};

/// Process exit status for success, including skipped copies.
pub const EXIT_OK: u8 = 0;
/// Process exit status for any failure.
pub const EXIT_FAILURE: u8 = 1;

const AFTER_HELP: &str = "\
Examples:
  arch-copier /data/report.zip /mnt/archive -S=20
  arch-copier /home/user/data.tar.gz /mnt/backup -L=50 -O

If no policy (-L, -P, -S) is given, -P=10 is used (keep 10% free space).";

/// Copy a file into an archive directory under a timestamped name, deleting
/// the oldest archived files first so the retention policy holds.
#[derive(Debug, Parser)]
#[command(name = "arch-copier")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true, args_override_self = true, after_help = AFTER_HELP)]
#[command(group(
    ArgGroup::new("policy")
        .args(["limit", "free_percent", "free_multiple"])
        .multiple(false)
))]
pub struct Cli {
    /// File to archive.
    pub source: PathBuf,

    /// Archive directory, created if missing.
    pub target_dir: PathBuf,

    /// Keep N files in the target directory, counting the new copy.
    #[arg(short = 'L', long = "limit", value_name = "N", value_parser = value_parser!(u64).range(1..))]
    pub limit: Option<u64>,

    /// Keep at least N% of the target filesystem free (default policy, N=10).
    #[arg(short = 'P', long = "free-percent", value_name = "N", value_parser = value_parser!(u8).range(0..=100))]
    pub free_percent: Option<u8>,

    /// Keep free space of at least N times the size of the copied file.
    #[arg(short = 'S', long = "free-multiple", value_name = "N", value_parser = value_parser!(u64).range(1..))]
    pub free_multiple: Option<u64>,

    /// Overwrite a file with the same name instead of skipping.
    #[arg(short = 'O', long)]
    pub overwrite: bool,

    /// Webhook URL that receives a JSON report of the outcome.
    #[arg(long, env = "ARCH_COPIER_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Telegram bot token for outcome messages.
    #[arg(long, env = "ARCH_COPIER_TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Telegram chat id for outcome messages.
    #[arg(long, env = "ARCH_COPIER_TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,

    /// Upper bound in seconds for delivering one notification.
    #[arg(long, env = "ARCH_COPIER_NOTIFY_TIMEOUT_SECS", default_value_t = DEFAULT_NOTIFY_TIMEOUT_SECS)]
    pub notify_timeout_secs: u64,
}

impl Cli {
    /// Resolve the archive request, applying the default policy.
    pub fn request(&self) -> Result<ArchiveRequest, CoreError> {
        let policy = Policy::resolve(self.limit, self.free_percent, self.free_multiple)?;
        Ok(ArchiveRequest {
            source: self.source.clone(),
            target_dir: self.target_dir.clone(),
            policy,
            overwrite: self.overwrite,
        })
    }

    pub fn notify_config(&self) -> NotifyConfig {
        NotifyConfig::from_parts(
            self.webhook_url.clone(),
            self.telegram_token.clone(),
            self.telegram_chat_id.clone(),
            self.notify_timeout_secs,
        )
    }
}

/// Exit status for an argument parsing error. Help and version output are
/// successes; everything else is a failure.
pub fn parse_error_status(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => EXIT_OK,
        _ => EXIT_FAILURE,
    }
}

/// Where parse-error output is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Text and destination stream for an argument parsing error.
///
/// A bare invocation prints the full help on stdout, like `--help`.
pub fn parse_error_output(err: &clap::Error) -> (Stream, String) {
    if err.kind() == ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand {
        return (Stream::Stdout, Cli::command().render_help().to_string());
    }
    let stream = if err.use_stderr() {
        Stream::Stderr
    } else {
        Stream::Stdout
    };
    (stream, err.render().to_string())
}

/// Run one archive operation and report it to the configured channel.
///
/// The filesystem work runs on the blocking pool. Notification failures
/// are logged and never change the result.
pub async fn run(cli: Cli) -> Result<ArchiveOutcome, CoreError> {
    let request = cli.request()?;
    let notifier = Notifier::from_config(&cli.notify_config());

    tracing::info!(
        source = %request.source.display(),
        target = %request.target_dir.display(),
        policy = %request.policy,
        overwrite = request.overwrite,
        notify = notifier.is_some(),
        "Starting archive copy",
    );

    let source = request.source.clone();
    let result = tokio::task::spawn_blocking(move || {
        archive::run(&request, &StatvfsProbe, Local::now())
    })
    .await
    .unwrap_or_else(|e| Err(CoreError::io("Archive task failed", std::io::Error::other(e))));

    if let Some(notifier) = &notifier {
        let notification = match &result {
            Ok(outcome) => Notification::from_outcome(&source, outcome),
            Err(e) => Notification::failure(&source, e),
        };
        notifier.notify_best_effort(&notification).await;
    }

    result
}
