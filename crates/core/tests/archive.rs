//! Integration tests for the end-to-end archive operation.

mod common;

use assert_matches::assert_matches;
use chrono::{DateTime, Local, TimeZone};

use arch_copier_core::archive::{self, destination_name};
use arch_copier_core::{ArchiveOutcome, ArchiveRequest, CoreError, DiskUsage, Policy};

use common::{remaining, write_series, FixedProbe};

const ROOMY: FixedProbe = FixedProbe(DiskUsage {
    free_bytes: u64::MAX / 2,
    total_bytes: u64::MAX / 2,
});

fn now() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2025, 1, 31, 23, 59, 58)
        .single()
        .expect("unambiguous local time")
}

fn request(source: &std::path::Path, target: &std::path::Path, policy: Policy) -> ArchiveRequest {
    ArchiveRequest {
        source: source.to_path_buf(),
        target_dir: target.to_path_buf(),
        policy,
        overwrite: false,
    }
}

#[test]
fn copies_source_under_timestamped_name() {
    let src_dir = tempfile::tempdir().expect("create temp dir");
    let target = tempfile::tempdir().expect("create temp dir");
    let source = src_dir.path().join("report.zip");
    std::fs::write(&source, b"payload").expect("write source");

    let outcome = archive::run(&request(&source, target.path(), Policy::default()), &ROOMY, now())
        .expect("archive");

    let expected = target.path().join("2025-01-31-23-59-58-report.zip");
    assert_matches!(
        &outcome,
        ArchiveOutcome::Copied { destination, bytes: 7, overwritten: false, .. }
            if *destination == expected
    );
    assert_eq!(std::fs::read(&expected).expect("read copy"), b"payload");
}

#[test]
fn creates_missing_target_directory() {
    let src_dir = tempfile::tempdir().expect("create temp dir");
    let root = tempfile::tempdir().expect("create temp dir");
    let source = src_dir.path().join("a.txt");
    std::fs::write(&source, b"a").expect("write source");
    let target = root.path().join("nested").join("archive");

    archive::run(&request(&source, &target, Policy::CountLimit(5)), &ROOMY, now())
        .expect("archive");

    assert_eq!(remaining(&target), ["2025-01-31-23-59-58-a.txt"]);
}

#[test]
fn count_limit_runs_before_copy() {
    let src_dir = tempfile::tempdir().expect("create temp dir");
    let target = tempfile::tempdir().expect("create temp dir");
    let source = src_dir.path().join("db.dump");
    std::fs::write(&source, b"dump").expect("write source");
    write_series(target.path(), 5, 100);

    let outcome = archive::run(&request(&source, target.path(), Policy::CountLimit(3)), &ROOMY, now())
        .expect("archive");

    let ArchiveOutcome::Copied { report, .. } = outcome else {
        panic!("expected a copy");
    };
    assert_eq!(report.deleted.len(), 3);
    assert_eq!(
        remaining(target.path()),
        ["F4", "F5", "2025-01-31-23-59-58-db.dump"]
    );
}

/// A name collision without overwrite skips everything, including the
/// retention pass that would otherwise empty the directory.
#[test]
fn collision_without_overwrite_skips() {
    let src_dir = tempfile::tempdir().expect("create temp dir");
    let target = tempfile::tempdir().expect("create temp dir");
    let source = src_dir.path().join("report.zip");
    std::fs::write(&source, b"new").expect("write source");
    write_series(target.path(), 3, 10);
    let name = destination_name(&source, &now()).expect("name");
    std::fs::write(target.path().join(&name), b"old").expect("write existing");

    let outcome = archive::run(&request(&source, target.path(), Policy::CountLimit(1)), &ROOMY, now())
        .expect("archive");

    assert_matches!(outcome, ArchiveOutcome::Skipped { .. });
    assert_eq!(remaining(target.path()).len(), 4);
    assert_eq!(std::fs::read(target.path().join(&name)).expect("read"), b"old");
}

#[test]
fn collision_with_overwrite_replaces_file() {
    let src_dir = tempfile::tempdir().expect("create temp dir");
    let target = tempfile::tempdir().expect("create temp dir");
    let source = src_dir.path().join("report.zip");
    std::fs::write(&source, b"new").expect("write source");
    let name = destination_name(&source, &now()).expect("name");
    std::fs::write(target.path().join(&name), b"old").expect("write existing");

    let mut req = request(&source, target.path(), Policy::CountLimit(10));
    req.overwrite = true;
    let outcome = archive::run(&req, &ROOMY, now()).expect("archive");

    assert_matches!(outcome, ArchiveOutcome::Copied { overwritten: true, .. });
    assert_eq!(std::fs::read(target.path().join(&name)).expect("read"), b"new");
}

#[test]
fn missing_source_fails_before_touching_target() {
    let src_dir = tempfile::tempdir().expect("create temp dir");
    let root = tempfile::tempdir().expect("create temp dir");
    let target = root.path().join("archive");

    let result = archive::run(
        &request(&src_dir.path().join("nope.bin"), &target, Policy::default()),
        &ROOMY,
        now(),
    );

    assert_matches!(result, Err(CoreError::NotFound(_)));
    assert!(!target.exists());
}

#[test]
fn directory_source_is_rejected() {
    let src_dir = tempfile::tempdir().expect("create temp dir");
    let target = tempfile::tempdir().expect("create temp dir");

    let result = archive::run(&request(src_dir.path(), target.path(), Policy::default()), &ROOMY, now());

    assert_matches!(result, Err(CoreError::Validation(_)));
}
