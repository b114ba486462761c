//! End-to-end semantics of the bundling engine against real files.
//!
//! These tests pin the observable contract: ordered concatenation with one
//! blank separator line per file, eager truncation, multi-target fan-out
//! and fail-fast aborts.

use std::fs;
use std::path::Path;

use proptest::prelude::*;
use sha2::{Digest, Sha256};
use tempfile::tempdir;

use collate_core::{engine, BundleError, BundleJob};

fn write_inputs(dir: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        fs::write(dir.join(name), content).unwrap();
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

// ============================================================================
// Reference scenario: minimal and maximal artifacts from shared manifests
// ============================================================================

#[test]
fn test_scenario_min_and_all_artifacts() {
    let dir = tempdir().unwrap();
    write_inputs(
        dir.path(),
        &[("license.txt", "L"), ("core.txt", "C"), ("extra.txt", "E")],
    );
    let out_min = dir.path().join("out_min.txt");
    let out_all = dir.path().join("out_all.txt");

    let job = BundleJob::builder()
        .base_dir(dir.path())
        .manifest("a", ["license.txt", "core.txt"])
        .manifest("b", ["extra.txt"])
        .target(&out_min, ["a"])
        .target(&out_all, ["a", "b"])
        .build()
        .unwrap();

    let report = engine::run(&job).unwrap();

    assert_eq!(read(&out_min), "L\n\nC\n\n");
    assert_eq!(read(&out_all), "L\n\nC\n\nE\n\n");

    let min = report.target(&out_min).unwrap();
    assert_eq!(min.files, 2);
    assert_eq!(min.bytes, 6);
    let all = report.target(&out_all).unwrap();
    assert_eq!(all.files, 3);
    assert_eq!(all.bytes, 9);
}

#[test]
fn test_report_digest_matches_disk_content() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path(), &[("a.txt", "alpha\nbeta\n")]);
    let out = dir.path().join("out.txt");

    let job = BundleJob::builder()
        .base_dir(dir.path())
        .manifest("m", ["a.txt"])
        .target(&out, ["m"])
        .build()
        .unwrap();

    let report = engine::run(&job).unwrap();
    let entry = report.target(&out).unwrap();

    let disk = fs::read(&out).unwrap();
    assert_eq!(entry.bytes, disk.len() as u64);
    assert_eq!(
        entry.digest,
        format!("sha256:{}", hex::encode(Sha256::digest(&disk)))
    );
}

// ============================================================================
// Truncation
// ============================================================================

#[test]
fn test_rerun_is_idempotent() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path(), &[("a.txt", "one\ntwo\n")]);
    let out = dir.path().join("out.txt");

    let job = BundleJob::builder()
        .base_dir(dir.path())
        .manifest("m", ["a.txt"])
        .target(&out, ["m"])
        .build()
        .unwrap();

    engine::run(&job).unwrap();
    let first = fs::read(&out).unwrap();

    // Stale content from an earlier run must not survive.
    fs::write(&out, "stale garbage that should vanish").unwrap();
    engine::run(&job).unwrap();
    assert_eq!(fs::read(&out).unwrap(), first);
}

#[test]
fn test_failed_run_still_truncates_untouched_targets() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path(), &[("a.txt", "A"), ("c.txt", "C")]);
    let broken = dir.path().join("broken.txt");
    let other = dir.path().join("other.txt");
    fs::write(&other, "previous successful output").unwrap();

    let job = BundleJob::builder()
        .base_dir(dir.path())
        .manifest("m", ["a.txt", "missing.txt", "c.txt"])
        .manifest("n", ["c.txt"])
        .target(&broken, ["m"])
        .target(&other, ["n"])
        .build()
        .unwrap();

    let err = engine::run(&job).unwrap_err();
    match err {
        BundleError::Input { path, .. } => {
            assert!(path.ends_with("missing.txt"));
        }
        other => panic!("unexpected error: {other}"),
    }

    // The failing target keeps what was written before the abort.
    assert_eq!(read(&broken), "A\n\n");
    // The other target was truncated up front and never written.
    assert_eq!(read(&other), "");
}

#[test]
fn test_parent_directories_are_created() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path(), &[("a.txt", "A")]);
    let out = dir.path().join("dist/nested/out.txt");

    let job = BundleJob::builder()
        .base_dir(dir.path())
        .manifest("m", ["a.txt"])
        .target(&out, ["m"])
        .build()
        .unwrap();

    engine::run(&job).unwrap();
    assert_eq!(read(&out), "A\n\n");
}

#[test]
fn test_unwritable_target_is_fatal() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path(), &[("a.txt", "A")]);
    let out = dir.path().join("taken");
    fs::create_dir(&out).unwrap();

    let job = BundleJob::builder()
        .base_dir(dir.path())
        .manifest("m", ["a.txt"])
        .target(&out, ["m"])
        .build()
        .unwrap();

    let err = engine::run(&job).unwrap_err();
    assert!(matches!(err, BundleError::Output { .. }));
}

// ============================================================================
// Separators and line handling
// ============================================================================

#[test]
fn test_empty_targets_are_zero_bytes() {
    let dir = tempdir().unwrap();
    let no_manifests = dir.path().join("none.txt");
    let empty_manifest = dir.path().join("empty.txt");

    let job = BundleJob::builder()
        .base_dir(dir.path())
        .manifest("empty", Vec::<&str>::new())
        .target(&no_manifests, Vec::<&str>::new())
        .target(&empty_manifest, ["empty"])
        .build()
        .unwrap();

    let report = engine::run(&job).unwrap();
    assert_eq!(read(&no_manifests), "");
    assert_eq!(read(&empty_manifest), "");
    assert_eq!(report.total_bytes(), 0);
}

#[test]
fn test_empty_file_contributes_one_separator() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path(), &[("empty.txt", ""), ("a.txt", "A")]);
    let out = dir.path().join("out.txt");

    let job = BundleJob::builder()
        .base_dir(dir.path())
        .manifest("m", ["empty.txt", "a.txt"])
        .target(&out, ["m"])
        .build()
        .unwrap();

    let report = engine::run(&job).unwrap();
    assert_eq!(read(&out), "\nA\n\n");
    assert_eq!(report.target(&out).unwrap().files, 2);
}

#[test]
fn test_crlf_input_is_normalized() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path(), &[("dos.txt", "one\r\ntwo\r\n")]);
    let out = dir.path().join("out.txt");

    let job = BundleJob::builder()
        .base_dir(dir.path())
        .manifest("m", ["dos.txt"])
        .target(&out, ["m"])
        .build()
        .unwrap();

    engine::run(&job).unwrap();
    assert_eq!(read(&out), "one\ntwo\n\n");
}

#[test]
fn test_missing_trailing_newline_is_terminated() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path(), &[("a.txt", "one\ntwo")]);
    let out = dir.path().join("out.txt");

    let job = BundleJob::builder()
        .base_dir(dir.path())
        .manifest("m", ["a.txt"])
        .target(&out, ["m"])
        .build()
        .unwrap();

    engine::run(&job).unwrap();
    assert_eq!(read(&out), "one\ntwo\n\n");
}

#[test]
fn test_trailing_blank_lines_are_kept() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path(), &[("a.txt", "one\n\n")]);
    let out = dir.path().join("out.txt");

    let job = BundleJob::builder()
        .base_dir(dir.path())
        .manifest("m", ["a.txt"])
        .target(&out, ["m"])
        .build()
        .unwrap();

    engine::run(&job).unwrap();
    // The file's own blank line survives, the separator is added on top.
    assert_eq!(read(&out), "one\n\n\n");
}

#[test]
fn test_repeated_file_is_bundled_twice() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path(), &[("a.txt", "A")]);
    let out = dir.path().join("out.txt");

    let job = BundleJob::builder()
        .base_dir(dir.path())
        .manifest("m", ["a.txt", "a.txt"])
        .target(&out, ["m"])
        .build()
        .unwrap();

    let report = engine::run(&job).unwrap();
    assert_eq!(read(&out), "A\n\nA\n\n");
    assert_eq!(report.target(&out).unwrap().files, 2);
}

// ============================================================================
// Fan-out and ordering
// ============================================================================

#[test]
fn test_shared_manifest_feeds_both_targets_identically() {
    let dir = tempdir().unwrap();
    write_inputs(
        dir.path(),
        &[("s1.txt", "shared one"), ("s2.txt", "shared two"), ("x.txt", "only b")],
    );
    let out_a = dir.path().join("a.txt.out");
    let out_b = dir.path().join("b.txt.out");

    let job = BundleJob::builder()
        .base_dir(dir.path())
        .manifest("shared", ["s1.txt", "s2.txt"])
        .manifest("extra", ["x.txt"])
        .target(&out_a, ["shared"])
        .target(&out_b, ["shared", "extra"])
        .build()
        .unwrap();

    engine::run(&job).unwrap();
    let a = read(&out_a);
    let b = read(&out_b);
    assert_eq!(a, "shared one\n\nshared two\n\n");
    assert!(b.starts_with(&a));
    assert_eq!(b, "shared one\n\nshared two\n\nonly b\n\n");
}

#[test]
fn test_divergent_manifest_orders_per_target() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path(), &[("one.txt", "1"), ("two.txt", "2")]);
    let out_a = dir.path().join("a.out");
    let out_b = dir.path().join("b.out");

    let job = BundleJob::builder()
        .base_dir(dir.path())
        .manifest("m1", ["one.txt"])
        .manifest("m2", ["two.txt"])
        .target(&out_a, ["m1", "m2"])
        .target(&out_b, ["m2", "m1"])
        .build()
        .unwrap();

    engine::run(&job).unwrap();
    assert_eq!(read(&out_a), "1\n\n2\n\n");
    assert_eq!(read(&out_b), "2\n\n1\n\n");
}

// ============================================================================
// Input probing
// ============================================================================

#[test]
fn test_probe_reports_every_missing_input() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path(), &[("present.txt", "ok")]);
    let out = dir.path().join("out.txt");

    let job = BundleJob::builder()
        .base_dir(dir.path())
        .manifest("m", ["present.txt", "gone.txt"])
        .manifest("n", ["also-gone.txt"])
        .target(&out, ["m", "n"])
        .build()
        .unwrap();

    let failures = engine::probe_inputs(&job);
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].manifest, "m");
    assert!(failures[0].path.ends_with("gone.txt"));
    assert_eq!(failures[1].manifest, "n");

    // Probing never touches targets.
    assert!(!out.exists());
}

#[test]
fn test_probe_is_empty_when_all_inputs_open() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path(), &[("a.txt", "A")]);

    let job = BundleJob::builder()
        .base_dir(dir.path())
        .manifest("m", ["a.txt"])
        .target(dir.path().join("out.txt"), ["m"])
        .build()
        .unwrap();

    assert!(engine::probe_inputs(&job).is_empty());
}

// ============================================================================
// Order preservation over arbitrary inputs
// ============================================================================

proptest! {
    #[test]
    fn test_order_preservation_property(
        files in prop::collection::vec(
            prop::collection::vec("[ -~]{0,40}", 0..8),
            0..6,
        )
    ) {
        let dir = tempdir().unwrap();
        let mut builder = BundleJob::builder().base_dir(dir.path());
        let mut names = Vec::new();
        let mut expected = String::new();

        for (i, lines) in files.iter().enumerate() {
            let name = format!("f{i}.txt");
            let mut content = String::new();
            for line in lines {
                content.push_str(line);
                content.push('\n');
            }
            fs::write(dir.path().join(&name), &content).unwrap();
            expected.push_str(&content);
            expected.push('\n');
            names.push(name);
        }

        let out = dir.path().join("out.txt");
        builder = builder.manifest("m", names).target(&out, ["m"]);
        let job = builder.build().unwrap();

        let report = engine::run(&job).unwrap();
        prop_assert_eq!(read(&out), expected.clone());
        prop_assert_eq!(report.target(&out).unwrap().bytes, expected.len() as u64);
    }
}
