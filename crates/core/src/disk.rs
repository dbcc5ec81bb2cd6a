//! Filesystem capacity queries.
//!
//! [`SpaceProbe`] is the seam between the retention enforcer and the
//! operating system. [`StatvfsProbe`] reads real numbers via `statvfs(3)`;
//! tests supply their own probes.

use std::path::Path;

use serde::Serialize;

use crate::error::CoreError;

/// Free and total bytes of the filesystem holding a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiskUsage {
    pub free_bytes: u64,
    pub total_bytes: u64,
}

impl DiskUsage {
    /// Bytes in use (`total - free`, never negative).
    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.free_bytes)
    }

    /// Free space as a percentage of the total, `0.0` for an empty filesystem.
    pub fn free_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            self.free_bytes as f64 / self.total_bytes as f64 * 100.0
        }
    }
}

/// Reads disk usage for the filesystem containing `dir`.
pub trait SpaceProbe {
    fn usage(&self, dir: &Path) -> Result<DiskUsage, CoreError>;
}

/// Production probe backed by `libc::statvfs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatvfsProbe;

impl SpaceProbe for StatvfsProbe {
    fn usage(&self, dir: &Path) -> Result<DiskUsage, CoreError> {
        statvfs_usage(dir)
    }
}

#[cfg(unix)]
fn statvfs_usage(dir: &Path) -> Result<DiskUsage, CoreError> {
    use std::ffi::CString;
    use std::mem::MaybeUninit;
    use std::os::unix::ffi::OsStrExt;

    let context = || format!("Failed to read disk usage for {}", dir.display());

    let c_path = CString::new(dir.as_os_str().as_bytes()).map_err(|e| {
        CoreError::io(
            context(),
            std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
        )
    })?;
    let mut stat = MaybeUninit::<libc::statvfs>::uninit();

    // Safety: `c_path` is a valid NUL-terminated string and `stat` points to
    // writable memory large enough for a `statvfs` struct.
    let ret = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
    if ret != 0 {
        return Err(CoreError::io(context(), std::io::Error::last_os_error()));
    }

    // Safety: statvfs returned 0, so the struct is initialised.
    let stat = unsafe { stat.assume_init() };
    let block_size = stat.f_frsize as u64;

    Ok(DiskUsage {
        free_bytes: stat.f_bavail as u64 * block_size,
        total_bytes: stat.f_blocks as u64 * block_size,
    })
}

#[cfg(not(unix))]
fn statvfs_usage(dir: &Path) -> Result<DiskUsage, CoreError> {
    Err(CoreError::io(
        format!("Failed to read disk usage for {}", dir.display()),
        std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "disk usage is only available on Unix targets",
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn used_bytes_saturates() {
        let usage = DiskUsage {
            free_bytes: 200,
            total_bytes: 100,
        };
        assert_eq!(usage.used_bytes(), 0);
    }

    #[test]
    fn free_percent_of_empty_filesystem_is_zero() {
        let usage = DiskUsage {
            free_bytes: 0,
            total_bytes: 0,
        };
        assert_eq!(usage.free_percent(), 0.0);
    }

    #[test]
    fn free_percent_is_proportional() {
        let usage = DiskUsage {
            free_bytes: 50,
            total_bytes: 1000,
        };
        assert!((usage.free_percent() - 5.0).abs() < f64::EPSILON);
    }

    #[cfg(unix)]
    #[test]
    fn statvfs_reports_a_real_filesystem() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let usage = StatvfsProbe.usage(dir.path()).expect("statvfs");
        assert!(usage.total_bytes > 0);
        assert!(usage.free_bytes <= usage.total_bytes);
    }

    #[cfg(unix)]
    #[test]
    fn statvfs_fails_for_missing_path() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let missing = dir.path().join("does-not-exist");
        let err = StatvfsProbe.usage(&missing).unwrap_err();
        assert!(err.to_string().contains("Failed to read disk usage"));
    }
}
