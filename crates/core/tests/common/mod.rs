//! Shared fixtures for the core integration tests.

#![allow(dead_code)]

use std::fs::File;
use std::path::Path;
use std::time::{Duration, SystemTime};

use arch_copier_core::{CoreError, DiskUsage, SpaceProbe};

/// Create `name` in `dir` with `len` bytes and an mtime `age_secs` in the past.
pub fn write_aged(dir: &Path, name: &str, len: usize, age_secs: u64) {
    let path = dir.join(name);
    std::fs::write(&path, vec![b'x'; len]).expect("write file");
    File::options()
        .write(true)
        .open(&path)
        .expect("open file")
        .set_modified(SystemTime::now() - Duration::from_secs(age_secs))
        .expect("set mtime");
}

/// Populate `dir` with `F1..=Fn`, each `len` bytes, `F1` the oldest.
pub fn write_series(dir: &Path, count: usize, len: usize) {
    for i in 1..=count {
        let age = ((count - i + 1) * 60) as u64;
        write_aged(dir, &format!("F{i}"), len, age);
    }
}

/// Names of the files currently in `dir`, oldest first.
pub fn remaining(dir: &Path) -> Vec<String> {
    arch_copier_core::inventory::list(dir)
        .expect("list")
        .into_iter()
        .map(|e| e.name)
        .collect()
}

/// Always reports the same usage.
pub struct FixedProbe(pub DiskUsage);

impl SpaceProbe for FixedProbe {
    fn usage(&self, _dir: &Path) -> Result<DiskUsage, CoreError> {
        Ok(self.0)
    }
}

/// Simulates a small filesystem whose only variable usage is the archive
/// directory itself: `free = total - other_used - bytes in dir`.
pub struct DirCapacityProbe {
    pub total_bytes: u64,
    pub other_used_bytes: u64,
}

impl SpaceProbe for DirCapacityProbe {
    fn usage(&self, dir: &Path) -> Result<DiskUsage, CoreError> {
        let in_dir: u64 = arch_copier_core::inventory::list(dir)?
            .iter()
            .map(|e| e.size_bytes)
            .sum();
        Ok(DiskUsage {
            free_bytes: self
                .total_bytes
                .saturating_sub(self.other_used_bytes)
                .saturating_sub(in_dir),
            total_bytes: self.total_bytes,
        })
    }
}
