//! Retention policies and their validation.
//!
//! Exactly one policy is active per run. When the caller names none,
//! [`Policy::default`] keeps 10% of the target filesystem free.

use std::fmt;

use serde::Serialize;

use crate::disk::DiskUsage;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Free-space percentage applied when no policy is given.
pub const DEFAULT_FREE_PERCENT: u8 = 10;

/// Upper bound for [`Policy::FreePercent`].
pub const MAX_FREE_PERCENT: u8 = 100;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// The active retention rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Policy {
    /// Keep at most this many files, counting the one being added.
    CountLimit(u64),
    /// Keep at least this percentage of the filesystem free.
    FreePercent(u8),
    /// Keep free space of at least this many times the incoming file size.
    FreeMultiple(u64),
}

impl Default for Policy {
    fn default() -> Self {
        Self::FreePercent(DEFAULT_FREE_PERCENT)
    }
}

impl Policy {
    /// Build a count-limit policy, rejecting zero.
    pub fn count_limit(max_files: u64) -> Result<Self, CoreError> {
        if max_files == 0 {
            return Err(CoreError::Validation(
                "count limit must be a positive integer".into(),
            ));
        }
        Ok(Self::CountLimit(max_files))
    }

    /// Build a free-percent policy, rejecting values above 100.
    pub fn free_percent(percent: u8) -> Result<Self, CoreError> {
        if percent > MAX_FREE_PERCENT {
            return Err(CoreError::Validation(format!(
                "free percent must be between 0 and {MAX_FREE_PERCENT}, got {percent}"
            )));
        }
        Ok(Self::FreePercent(percent))
    }

    /// Build a free-multiple policy, rejecting zero.
    pub fn free_multiple(multiple: u64) -> Result<Self, CoreError> {
        if multiple == 0 {
            return Err(CoreError::Validation(
                "free multiple must be a positive integer".into(),
            ));
        }
        Ok(Self::FreeMultiple(multiple))
    }

    /// Resolve at most one policy from optional flag values.
    ///
    /// Returns the default policy when all are `None` and a validation error
    /// when more than one is set.
    pub fn resolve(
        count_limit: Option<u64>,
        free_percent: Option<u8>,
        free_multiple: Option<u64>,
    ) -> Result<Self, CoreError> {
        match (count_limit, free_percent, free_multiple) {
            (None, None, None) => Ok(Self::default()),
            (Some(n), None, None) => Self::count_limit(n),
            (None, Some(p), None) => Self::free_percent(p),
            (None, None, Some(m)) => Self::free_multiple(m),
            _ => Err(CoreError::Validation(
                "only one retention policy may be given".into(),
            )),
        }
    }

    /// Free bytes required before the copy, or `None` for count limits.
    ///
    /// `FreePercent` rounds down: `floor(percent / 100 * total)`.
    pub fn required_free_bytes(&self, usage: &DiskUsage, incoming_bytes: u64) -> Option<u64> {
        match *self {
            Self::CountLimit(_) => None,
            Self::FreePercent(percent) => {
                let required = u128::from(usage.total_bytes) * u128::from(percent) / 100;
                Some(u64::try_from(required).unwrap_or(u64::MAX))
            }
            Self::FreeMultiple(multiple) => Some(incoming_bytes.saturating_mul(multiple)),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CountLimit(n) => write!(f, "keep {n} files"),
            Self::FreePercent(p) => write!(f, "keep {p}% free"),
            Self::FreeMultiple(m) => write!(f, "keep {m}x incoming size free"),
        }
    }
}
