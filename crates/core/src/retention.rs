//! Retention enforcement: delete the oldest archived files until the active
//! policy holds for the file about to be added.
//!
//! Deletions run strictly oldest-first, one at a time. A failed deletion
//! stops the pass and is returned as an error; files already removed stay
//! removed.

use std::path::Path;

use crate::disk::{DiskUsage, SpaceProbe};
use crate::error::CoreError;
use crate::inventory::{self, Entry};
use crate::policy::Policy;

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Result of a count-limit pass.
#[derive(Debug, Clone)]
pub struct CountLimitReport {
    pub deleted: Vec<Entry>,
    /// Files left in the directory before the new one is added.
    pub kept: usize,
}

/// Result of a free-space pass.
#[derive(Debug, Clone)]
pub struct FreeSpaceReport {
    pub required_free_bytes: u64,
    pub before: DiskUsage,
    /// Fresh reading taken after the deletions.
    pub after: DiskUsage,
    pub deleted: Vec<Entry>,
    /// `false` when the directory ran out of files before the running
    /// free-space estimate reached the requirement.
    pub satisfied: bool,
}

/// Policy-independent summary of one enforcement pass.
#[derive(Debug, Clone)]
pub struct EnforcementReport {
    pub policy: Policy,
    pub required_free_bytes: Option<u64>,
    pub deleted: Vec<Entry>,
    pub before: Option<DiskUsage>,
    pub after: Option<DiskUsage>,
    pub satisfied: bool,
}

impl EnforcementReport {
    /// Total size of the deleted files.
    pub fn bytes_reclaimed(&self) -> u64 {
        self.deleted.iter().map(|e| e.size_bytes).sum()
    }
}

// ---------------------------------------------------------------------------
// Count limit
// ---------------------------------------------------------------------------

/// Trim `dir` so that, once one more file is added, it holds `max_files`.
///
/// With `n` files present and `n >= max_files`, the oldest
/// `n - (max_files - 1)` are deleted. Nothing happens when `n < max_files`.
pub fn enforce_count_limit(dir: &Path, max_files: u64) -> Result<CountLimitReport, CoreError> {
    if max_files == 0 {
        return Err(CoreError::Validation(
            "count limit must be a positive integer".into(),
        ));
    }

    let inventory = inventory::list(dir)?;
    let keep = usize::try_from(max_files - 1).unwrap_or(usize::MAX);

    if inventory.len() <= keep {
        tracing::debug!(files = inventory.len(), max_files, "Count limit already satisfied");
        return Ok(CountLimitReport {
            deleted: Vec::new(),
            kept: inventory.len(),
        });
    }

    let excess = inventory.len() - keep;
    let deleted = delete_oldest(inventory.into_iter().take(excess))?;

    Ok(CountLimitReport { deleted, kept: keep })
}

/// Delete `entries` in iteration order, stopping at the first failure.
///
/// Files removed before the failure stay removed.
pub fn delete_oldest<I>(entries: I) -> Result<Vec<Entry>, CoreError>
where
    I: IntoIterator<Item = Entry>,
{
    let mut deleted = Vec::new();
    for entry in entries {
        delete_entry(&entry)?;
        tracing::info!(file = %entry.name, bytes = entry.size_bytes, "Deleted oldest file");
        deleted.push(entry);
    }
    Ok(deleted)
}

// ---------------------------------------------------------------------------
// Free space
// ---------------------------------------------------------------------------

/// Delete the oldest files in `dir` until at least `required_free_bytes` are
/// free on its filesystem.
///
/// Free space is read once up front and then tracked by adding the size of
/// each deleted file. Running out of files is not an error; the report's
/// `satisfied` flag is `false` in that case.
pub fn enforce_free_space<P>(
    dir: &Path,
    required_free_bytes: u64,
    probe: &P,
) -> Result<FreeSpaceReport, CoreError>
where
    P: SpaceProbe + ?Sized,
{
    let before = probe.usage(dir)?;
    free_space_pass(dir, required_free_bytes, before, probe)
}

/// Free-space pass starting from an already taken `before` reading.
fn free_space_pass<P>(
    dir: &Path,
    required_free_bytes: u64,
    before: DiskUsage,
    probe: &P,
) -> Result<FreeSpaceReport, CoreError>
where
    P: SpaceProbe + ?Sized,
{
    if before.free_bytes >= required_free_bytes {
        tracing::debug!(
            free_bytes = before.free_bytes,
            required_free_bytes,
            "Enough free space, nothing to delete"
        );
        return Ok(FreeSpaceReport {
            required_free_bytes,
            before,
            after: before,
            deleted: Vec::new(),
            satisfied: true,
        });
    }

    let mut remaining = inventory::list(dir)?.into_iter();
    let mut free = before.free_bytes;
    let mut deleted = Vec::new();

    while free < required_free_bytes {
        let Some(oldest) = remaining.next() else {
            break;
        };
        delete_entry(&oldest)?;
        free = free.saturating_add(oldest.size_bytes);
        tracing::info!(
            file = %oldest.name,
            bytes = oldest.size_bytes,
            "Deleted file due to low disk space"
        );
        deleted.push(oldest);
    }

    let satisfied = free >= required_free_bytes;
    if !satisfied {
        tracing::warn!(
            estimated_free_bytes = free,
            required_free_bytes,
            "No files left to delete, free space requirement not met"
        );
    }

    let after = probe.usage(dir)?;

    Ok(FreeSpaceReport {
        required_free_bytes,
        before,
        after,
        deleted,
        satisfied,
    })
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run the enforcement pass for `policy` ahead of adding a file of
/// `incoming_bytes` to `dir`.
///
/// Count-limit passes read disk usage only for reporting; a failed reading
/// there is logged and leaves `before`/`after` empty.
pub fn enforce<P>(
    dir: &Path,
    policy: Policy,
    incoming_bytes: u64,
    probe: &P,
) -> Result<EnforcementReport, CoreError>
where
    P: SpaceProbe + ?Sized,
{
    tracing::debug!(dir = %dir.display(), %policy, incoming_bytes, "Applying retention policy");

    match policy {
        Policy::CountLimit(max_files) => {
            let before = usage_for_report(dir, probe);
            let report = enforce_count_limit(dir, max_files)?;
            let after = usage_for_report(dir, probe);
            Ok(EnforcementReport {
                policy,
                required_free_bytes: None,
                deleted: report.deleted,
                before,
                after,
                satisfied: true,
            })
        }
        Policy::FreePercent(_) | Policy::FreeMultiple(_) => {
            let usage = probe.usage(dir)?;
            let required = policy
                .required_free_bytes(&usage, incoming_bytes)
                .unwrap_or_default();
            let report = free_space_pass(dir, required, usage, probe)?;
            Ok(EnforcementReport {
                policy,
                required_free_bytes: Some(required),
                deleted: report.deleted,
                before: Some(report.before),
                after: Some(report.after),
                satisfied: report.satisfied,
            })
        }
    }
}

fn usage_for_report<P>(dir: &Path, probe: &P) -> Option<DiskUsage>
where
    P: SpaceProbe + ?Sized,
{
    match probe.usage(dir) {
        Ok(usage) => Some(usage),
        Err(e) => {
            tracing::warn!(error = %e, "Disk usage unavailable for report");
            None
        }
    }
}

fn delete_entry(entry: &Entry) -> Result<(), CoreError> {
    std::fs::remove_file(&entry.path)
        .map_err(|e| CoreError::io(format!("Failed to delete {}", entry.path.display()), e))
}
