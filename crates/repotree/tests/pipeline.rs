mod common;

use flate2::Compression;
use repotree::{FailureKind, FilterSpec, Node, OutputMode, Phase, Pipeline, RunCounts, Tree};

use common::{Fixture, Stub, channel, collect, config, errors, mapped, tarball, tarball_with};

fn two_file_archive() -> Vec<u8> {
    tarball(&[
        Fixture::Dir("dir/"),
        Fixture::File("dir/file1.txt", "Content 1"),
        Fixture::File("dir/file2.go", "Content 2"),
    ])
}

#[test]
fn scoped_and_filtered_run() {
    let (reporter, rx) = channel();
    let worker = Pipeline::new(
        config("dir", FilterSpec::new([".txt"], Vec::<String>::new())),
        Stub::Body(two_file_archive()),
    )
    .reporter(reporter)
    .spawn()
    .unwrap();

    let events = collect(rx);
    let extraction = worker.join().unwrap().unwrap();

    let mut expected = Tree::new();
    expected.insert_path("file1.txt", "Content 1".into()).unwrap();
    assert_eq!(extraction.tree, expected);
    assert_eq!(mapped(&events), ["file1.txt"]);
    assert!(errors(&events).is_empty());
    assert_eq!(extraction.report, None);
}

#[test]
fn unscoped_run_keeps_full_paths() {
    let extraction = Pipeline::new(
        config("", FilterSpec::default()),
        Stub::Body(two_file_archive()),
    )
    .run()
    .unwrap();

    let json = serde_json::to_value(&extraction.tree).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "dir": {
                "file1.txt": "Content 1",
                "file2.go": "Content 2",
            }
        })
    );
}

#[test]
fn directories_never_become_leaves() {
    let bytes = tarball(&[
        Fixture::Dir("repo-main/"),
        Fixture::Dir("repo-main/empty/"),
        Fixture::Dir("repo-main/src/"),
        Fixture::File("repo-main/src/lib.rs", "pub fn f() {}"),
    ]);
    let extraction = Pipeline::new(config("repo-main", FilterSpec::default()), Stub::Body(bytes))
        .run()
        .unwrap();

    assert!(extraction.tree.get("empty").is_none());
    match extraction.tree.get("src") {
        Some(Node::Dir(src)) => assert_eq!(src.get_path("lib.rs"), Some(&Node::File("pub fn f() {}".into()))),
        other => panic!("expected src directory, got {other:?}"),
    }
}

#[test]
fn counts_cover_whole_archive() {
    let bytes = tarball(&[
        Fixture::Dir("repo-main/"),
        Fixture::File("repo-main/README.md", "# repo"),
        Fixture::Dir("repo-main/src/"),
        Fixture::File("repo-main/src/main.rs", "fn main() {}"),
        Fixture::File("repo-main/src/main_test.rs", "#[test] fn t() {}"),
        Fixture::Symlink("repo-main/latest", "src/main.rs"),
        Fixture::Dir("repo-main/docs/"),
        Fixture::File("repo-main/docs/guide.md", "guide"),
    ]);

    let (reporter, rx) = channel();
    let worker = Pipeline::new(
        config("repo-main/src", FilterSpec::new([".rs"], ["_test.rs"])),
        Stub::Body(bytes),
    )
    .reporter(reporter)
    .spawn()
    .unwrap();

    let events = collect(rx);
    let extraction = worker.join().unwrap().unwrap();

    assert_eq!(
        extraction.counts,
        RunCounts {
            directories: 3,
            files: 4,
            kept: 1,
        }
    );
    assert_eq!(mapped(&events), ["main.rs"]);

    let descriptions: Vec<&str> = events.iter().map(|e| e.description.as_str()).collect();
    assert_eq!(
        descriptions,
        [
            "downloading: https://github.com/user/repo/archive/refs/heads/main.tar.gz",
            "mapped: main.rs",
            "found: 3 directories and 4 files",
            "prepared: 1 out of 4 files for report",
        ]
    );
}

#[test]
fn non_success_status_fails_before_mapping() {
    let (reporter, rx) = channel();
    let worker = Pipeline::new(config("dir", FilterSpec::default()), Stub::Status(404))
        .reporter(reporter)
        .spawn()
        .unwrap();

    let events = collect(rx);
    let err = worker.join().unwrap().unwrap_err();

    assert_eq!(err.kind(), FailureKind::Transport);
    assert!(mapped(&events).is_empty());

    let failures = errors(&events);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].error, Some(FailureKind::Transport));
    assert_eq!(failures[0].description, "unexpected status code: 404");
    assert_eq!(events.last(), Some(failures[0]));
}

#[test]
fn file_then_nested_file_is_a_structure_conflict() {
    let bytes = tarball(&[
        Fixture::File("repo-main/a", "leaf"),
        Fixture::File("repo-main/a/b", "nested"),
    ]);

    let (reporter, rx) = channel();
    let worker = Pipeline::new(config("repo-main", FilterSpec::default()), Stub::Body(bytes))
        .reporter(reporter)
        .spawn()
        .unwrap();

    let events = collect(rx);
    let err = worker.join().unwrap().unwrap_err();

    assert_eq!(err.kind(), FailureKind::StructureConflict);
    assert_eq!(mapped(&events), ["a"]);
    assert_eq!(errors(&events).len(), 1);
    assert!(!events.iter().any(|e| e.description.starts_with("found:")));
}

#[test]
fn non_gzip_body_is_a_decode_failure() {
    let err = Pipeline::new(
        config("", FilterSpec::default()),
        Stub::Body(b"<!DOCTYPE html><title>Not Found</title>".to_vec()),
    )
    .run()
    .unwrap_err();

    assert_eq!(err.kind(), FailureKind::Decode);
}

#[test]
fn missing_gzip_trailer_is_a_decode_failure() {
    let bytes = two_file_archive();
    let truncated = bytes[..bytes.len() - 8].to_vec();

    let (reporter, rx) = channel();
    let worker = Pipeline::new(config("dir", FilterSpec::default()), Stub::Body(truncated))
        .reporter(reporter)
        .spawn()
        .unwrap();

    let events = collect(rx);
    let err = worker.join().unwrap().unwrap_err();

    assert_eq!(err.kind(), FailureKind::Decode);
    assert_eq!(errors(&events).len(), 1);
    assert!(!events.iter().any(|e| e.description.starts_with("found:")));
}

#[test]
fn corrupted_checksum_is_a_decode_failure() {
    let mut bytes = two_file_archive();
    let crc = bytes.len() - 8;
    bytes[crc] ^= 0xff;

    let err = Pipeline::new(config("dir", FilterSpec::default()), Stub::Body(bytes))
        .run()
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::Decode);
}

#[test]
fn dropped_connection_is_a_transport_failure() {
    let big = "x".repeat(64 * 1024);
    let bytes = tarball_with(
        &[
            Fixture::File("repo-main/small.txt", "small"),
            Fixture::File("repo-main/big.txt", &big),
        ],
        Compression::none(),
    );
    let truncated = bytes[..bytes.len() / 2].to_vec();

    let err = Pipeline::new(
        config("repo-main", FilterSpec::default()),
        Stub::Interrupted(truncated),
    )
    .run()
    .unwrap_err();

    assert_eq!(err.kind(), FailureKind::Transport);
}

#[test]
fn file_mode_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config("dir", FilterSpec::new([".txt"], Vec::<String>::new()));
    cfg.output = OutputMode::File(dir.path().to_path_buf());

    let (reporter, rx) = channel();
    let worker = Pipeline::new(cfg, Stub::Body(two_file_archive()))
        .reporter(reporter)
        .spawn()
        .unwrap();

    let events = collect(rx);
    let extraction = worker.join().unwrap().unwrap();

    let report = extraction.report.expect("file mode produces a report");
    assert_eq!(report.parent(), Some(dir.path()));
    assert_eq!(events.len(), 5);
    assert_eq!(
        events.last().map(|e| e.description.clone()),
        Some(format!("generated report: {}", report.display()))
    );

    let saved = std::fs::read_to_string(&report).unwrap();
    assert_eq!(saved, "{\n  \"file1.txt\": \"Content 1\"\n}\n");
}

#[test]
fn failed_run_leaves_no_report() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config("", FilterSpec::default());
    cfg.output = OutputMode::File(dir.path().to_path_buf());

    let err = Pipeline::new(cfg, Stub::Status(500)).run().unwrap_err();

    assert_eq!(err.kind(), FailureKind::Transport);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn staggered_run_still_completes() {
    let extraction = Pipeline::new(config("dir", FilterSpec::default()), Stub::Body(two_file_archive()))
        .stagger(std::time::Duration::from_millis(1))
        .run()
        .unwrap();

    assert_eq!(extraction.counts.kept, 2);
}

#[test]
fn new_pipeline_starts_idle() {
    let pipeline = Pipeline::new(config("", FilterSpec::default()), Stub::Status(404));
    assert_eq!(pipeline.phase(), Phase::Idle);
}
