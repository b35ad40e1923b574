//! Integration test: record lookups over HTTP against a local server, and a
//! full remote check of a release built on disk.

mod common;

use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::record_server::{self, Response};
use relcheck_core::config::{RemoteConfig, VerifyConfig};
use relcheck_core::control::{CancelToken, Cancelled};
use relcheck_core::progress::ProgressTracker;
use relcheck_core::remote::{self, FetchError, RecordSource, RemoteError, SrrDb};
use relcheck_core::session::Session;
use relcheck_core::tree::ReleaseTree;
use tempfile::tempdir;

const RECORD: &str = r#"{
    "name": "Some.Release-GRP",
    "files": [{"name": "some.release-grp.sfv", "size": 120, "crc": "0badf00d"}],
    "archived-files": [
        {"name": "grp.r00", "size": 15, "crc": "d6c0d9db"},
        {"name": "grp.rar", "size": 15, "crc": "e4f6bb59"}
    ],
    "adds": []
}"#;

fn client(api_url: &str) -> SrrDb {
    SrrDb::new(&RemoteConfig {
        api_url: api_url.to_string(),
        timeout_secs: 10,
        connect_timeout_secs: 5,
    })
    .unwrap()
}

#[test]
fn fetches_and_decodes_record() {
    let server = record_server::start(vec![(
        "/v1/details/Some.Release-GRP",
        Response::ok(RECORD),
    )]);
    let record = client(&server.api_url)
        .fetch("Some.Release-GRP", &CancelToken::new())
        .unwrap();
    assert_eq!(record.name, "Some.Release-GRP");
    assert_eq!(record.archived_files.len(), 2);
    assert_eq!(record.total_size(), 30);
}

#[test]
fn release_name_is_path_escaped() {
    let server = record_server::start(vec![]);
    let _ = client(&server.api_url).fetch("Odd Name/Part?1", &CancelToken::new());
    assert_eq!(server.requests(), ["/v1/details/Odd%20Name%2FPart%3F1"]);
}

#[test]
fn not_found_shapes() {
    let server = record_server::start(vec![
        ("/v1/details/empty", Response::ok("")),
        ("/v1/details/list", Response::ok("[]")),
        (
            "/v1/details/marker",
            Response::ok("The SRR file does not exist."),
        ),
        ("/v1/details/broken", Response::ok("{not json")),
    ]);
    let db = client(&server.api_url);
    let cancel = CancelToken::new();
    for name in ["empty", "list", "marker"] {
        assert!(
            matches!(db.fetch(name, &cancel), Err(FetchError::NotFound { .. })),
            "{name}"
        );
    }
    assert!(matches!(
        db.fetch("broken", &cancel),
        Err(FetchError::Decode { .. })
    ));
    assert!(matches!(
        db.fetch("unknown", &cancel),
        Err(FetchError::Status { code: 404, .. })
    ));
}

#[test]
fn deadline_aborts_slow_lookup() {
    let server = record_server::start(vec![(
        "/v1/details/slow",
        Response::ok(RECORD).delayed(Duration::from_secs(20)),
    )]);
    let cancel = CancelToken::with_timeout(Duration::from_millis(200));
    let started = Instant::now();
    let err = client(&server.api_url).fetch("slow", &cancel).unwrap_err();
    assert!(matches!(err, FetchError::Cancelled(Cancelled::DeadlineExceeded)), "{err}");
    assert!(started.elapsed() < Duration::from_secs(15));
}

#[test]
fn explicit_cancel_aborts_slow_lookup() {
    let server = record_server::start(vec![(
        "/v1/details/slow",
        Response::ok(RECORD).delayed(Duration::from_secs(8)),
    )]);
    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(200));
        trigger.cancel();
    });
    let started = Instant::now();
    let err = client(&server.api_url).fetch("slow", &cancel).unwrap_err();
    assert!(matches!(err, FetchError::Cancelled(Cancelled::Canceled)), "{err}");
    assert!(started.elapsed() < Duration::from_secs(6));
}

#[test]
fn remote_check_of_release_on_disk() {
    let server = record_server::start(vec![(
        "/v1/details/Some.Release-GRP",
        Response::ok(RECORD),
    )]);
    let dir = tempdir().unwrap();
    let rel = dir.path().join("Some.Release-GRP");
    fs::create_dir_all(rel.join("Sample")).unwrap();
    fs::write(rel.join("grp.r00"), b"test-content-1\n").unwrap();
    fs::write(rel.join("grp.rar"), b"test-content-3\n").unwrap();
    fs::write(rel.join("grp.mkv"), b"media").unwrap();
    fs::write(rel.join("Sample").join("grp-sample.mkv"), b"sample").unwrap();
    let tree = ReleaseTree::scan(dir.path()).unwrap();

    let mut config = VerifyConfig::default();
    config.remote.api_url = server.api_url.clone();
    let source = SrrDb::new(&config.remote).unwrap();
    let tracker = Arc::new(ProgressTracker::new(0));
    let session = Session::with_progress(&config, CancelToken::new(), true, tracker.clone());
    let media: Vec<_> = tree.files_with_extension("mkv").collect();

    let report = remote::check_release(&session, &source, &tree, &media, false).unwrap();
    assert_eq!(report.records, ["Some.Release-GRP"]);
    assert_eq!(report.files_checked, 2);
    assert_eq!(tracker.snapshot().bytes_done, 30);
    // "Sample" has no record: looked up, logged, skipped.
    assert_eq!(server.requests().len(), 2);

    fs::write(rel.join("grp.rar"), b"test-content-9\n").unwrap();
    let tracker = Arc::new(ProgressTracker::new(0));
    let session = Session::with_progress(&config, CancelToken::new(), false, tracker.clone());
    let err = remote::check_release(&session, &source, &tree, &media, false).unwrap_err();
    assert!(matches!(err, RemoteError::CrcMismatch { ref file, .. } if file == "grp.rar"));
    assert!(tracker.is_cancelled());
}
