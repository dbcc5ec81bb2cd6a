//! The archive operation: name the copy, settle collisions, enforce the
//! retention policy, then copy the source file in.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::disk::SpaceProbe;
use crate::error::CoreError;
use crate::policy::Policy;
use crate::retention::{self, EnforcementReport};

/// `chrono` format for the destination name prefix, second precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Fully validated input for one archive run.
#[derive(Debug, Clone)]
pub struct ArchiveRequest {
    pub source: PathBuf,
    pub target_dir: PathBuf,
    pub policy: Policy,
    /// Replace an existing file with the same destination name.
    pub overwrite: bool,
}

/// What an archive run did.
#[derive(Debug, Clone)]
pub enum ArchiveOutcome {
    Copied {
        destination: PathBuf,
        bytes: u64,
        overwritten: bool,
        report: EnforcementReport,
    },
    /// The destination already existed and overwrite was off. Nothing was
    /// deleted or copied.
    Skipped { destination: PathBuf },
}

impl ArchiveOutcome {
    pub fn destination(&self) -> &Path {
        match self {
            Self::Copied { destination, .. } | Self::Skipped { destination } => destination,
        }
    }
}

/// Build `<timestamp>-<stem><.ext>` for `source` at `now`.
///
/// The extension keeps its dot; a source without one gets none.
pub fn destination_name(source: &Path, now: &DateTime<Local>) -> Result<String, CoreError> {
    let stem = source.file_stem().ok_or_else(|| {
        CoreError::Validation(format!(
            "source path has no file name: {}",
            source.display()
        ))
    })?;
    let ext = source
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    Ok(format!(
        "{}-{}{}",
        now.format(TIMESTAMP_FORMAT),
        stem.to_string_lossy(),
        ext
    ))
}

/// Execute one archive run.
///
/// Source problems are reported before anything on disk changes. A copy
/// failure is returned after the retention pass, so the target may already
/// have been pruned.
pub fn run<P>(
    request: &ArchiveRequest,
    probe: &P,
    now: DateTime<Local>,
) -> Result<ArchiveOutcome, CoreError>
where
    P: SpaceProbe + ?Sized,
{
    let source_meta = match std::fs::metadata(&request.source) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CoreError::NotFound(request.source.clone()));
        }
        Err(e) => {
            return Err(CoreError::io(
                format!("Failed to stat {}", request.source.display()),
                e,
            ));
        }
    };
    if !source_meta.is_file() {
        return Err(CoreError::Validation(format!(
            "source is not a regular file: {}",
            request.source.display()
        )));
    }

    std::fs::create_dir_all(&request.target_dir).map_err(|e| {
        CoreError::io(
            format!("Failed to create {}", request.target_dir.display()),
            e,
        )
    })?;

    let file_name = destination_name(&request.source, &now)?;
    let destination = request.target_dir.join(&file_name);

    let exists = destination
        .try_exists()
        .map_err(|e| CoreError::io(format!("Failed to stat {}", destination.display()), e))?;
    if exists {
        if !request.overwrite {
            tracing::info!(file = %file_name, "File already exists. Skipping");
            return Ok(ArchiveOutcome::Skipped { destination });
        }
        tracing::info!(file = %file_name, "File exists. Overwrite enabled");
    }

    let report = retention::enforce(
        &request.target_dir,
        request.policy,
        source_meta.len(),
        probe,
    )?;

    let bytes = std::fs::copy(&request.source, &destination).map_err(|e| {
        CoreError::io(
            format!(
                "Failed to copy {} to {}",
                request.source.display(),
                destination.display()
            ),
            e,
        )
    })?;
    tracing::info!(file = %file_name, bytes, "Copied as {file_name}");

    Ok(ArchiveOutcome::Copied {
        destination,
        bytes,
        overwritten: exists,
        report,
    })
}
