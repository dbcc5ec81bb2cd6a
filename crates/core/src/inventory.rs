//! Directory inventory: the archive's files ordered oldest-first.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::CoreError;

/// Metadata snapshot of one archived file, taken at inventory time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: SystemTime,
}

/// List the regular files directly inside `dir`, oldest modification first.
///
/// Subdirectories and other non-file entries are skipped. Symlinks are
/// followed for metadata. Any read or stat failure fails the whole call.
/// Entries with identical timestamps keep their directory-listing order.
pub fn list(dir: &Path) -> Result<Vec<Entry>, CoreError> {
    let read_dir = std::fs::read_dir(dir)
        .map_err(|e| CoreError::io(format!("Failed to read directory {}", dir.display()), e))?;

    let mut entries = Vec::new();
    for dir_entry in read_dir {
        let dir_entry = dir_entry.map_err(|e| {
            CoreError::io(format!("Failed to read directory {}", dir.display()), e)
        })?;
        let path = dir_entry.path();
        let metadata = std::fs::metadata(&path)
            .map_err(|e| CoreError::io(format!("Failed to stat {}", path.display()), e))?;

        if !metadata.is_file() {
            tracing::debug!(path = %path.display(), "Skipping non-file entry");
            continue;
        }

        let modified = metadata
            .modified()
            .map_err(|e| CoreError::io(format!("Failed to stat {}", path.display()), e))?;

        entries.push(Entry {
            name: dir_entry.file_name().to_string_lossy().into_owned(),
            path,
            size_bytes: metadata.len(),
            modified,
        });
    }

    // `sort_by_key` is stable, so ties keep listing order.
    entries.sort_by_key(|entry| entry.modified);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::time::Duration;

    use super::*;

    fn write_file(dir: &Path, name: &str, len: usize, age_secs: u64) {
        let path = dir.join(name);
        std::fs::write(&path, vec![0u8; len]).expect("write file");
        let mtime = SystemTime::now() - Duration::from_secs(age_secs);
        File::options()
            .write(true)
            .open(&path)
            .expect("open file")
            .set_modified(mtime)
            .expect("set mtime");
    }

    #[test]
    fn lists_files_oldest_first() {
        let dir = tempfile::tempdir().expect("create temp dir");
        write_file(dir.path(), "middle.bin", 20, 200);
        write_file(dir.path(), "newest.bin", 30, 100);
        write_file(dir.path(), "oldest.bin", 10, 300);

        let entries = list(dir.path()).expect("list");
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["oldest.bin", "middle.bin", "newest.bin"]);
        assert_eq!(entries[0].size_bytes, 10);
        assert_eq!(entries[0].path, dir.path().join("oldest.bin"));
    }

    #[test]
    fn skips_subdirectories() {
        let dir = tempfile::tempdir().expect("create temp dir");
        write_file(dir.path(), "a.txt", 1, 10);
        std::fs::create_dir(dir.path().join("nested")).expect("create subdir");

        let entries = list(dir.path()).expect("list");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "a.txt");
    }

    #[test]
    fn empty_directory_yields_empty_inventory() {
        let dir = tempfile::tempdir().expect("create temp dir");
        assert!(list(dir.path()).expect("list").is_empty());
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = list(&dir.path().join("gone")).unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }
}
