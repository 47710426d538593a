//! On-disk format specs
//!
//! Verify the exact array layout, record keys and rotation handling.

use crate::prelude::*;
use splice::{Level, Registry};

#[tokio::test]
async fn single_record_is_a_one_element_array() {
    let daemon = Daemon::start();
    let target = daemon.work_path().join("one.log");

    let registry = Registry::connect(daemon.socket_path()).await.unwrap();
    let log = registry.logger([&target], "");
    splice::info!(log, "hello").unwrap();
    registry.flush().await.unwrap();

    let text = std::fs::read_to_string(&target).unwrap();
    assert!(text.starts_with("[{"), "{text}");
    assert!(text.ends_with("}]"), "{text}");

    let items = read_array(&target);
    assert_eq!(items.len(), 1);
    let record = items[0].as_object().unwrap();
    let keys: Vec<_> = record.keys().map(String::as_str).collect();
    similar_asserts::assert_eq!(
        keys,
        [
            "message",
            "level",
            "timestamp",
            "process_id",
            "module",
            "function",
            "file",
            "line"
        ]
    );
    assert_eq!(record["message"], "hello");
    assert_eq!(record["function"], "single_record_is_a_one_element_array");
    assert!(record["file"].as_str().unwrap().ends_with("format.rs"));
}

#[tokio::test]
async fn namespace_and_fields_are_top_level_keys() {
    let daemon = Daemon::start();
    let target = daemon.work_path().join("fields.log");

    let registry = Registry::connect(daemon.socket_path()).await.unwrap();
    let log = registry.logger([&target], "billing");
    log.bind("tenant", "acme").unwrap();
    splice::critical!(log, "charge failed", amount = 12.5, retry = false).unwrap();
    registry.flush().await.unwrap();

    let items = read_array(&target);
    assert_eq!(items[0]["namespace"], "billing");
    assert_eq!(items[0]["tenant"], "acme");
    assert_eq!(items[0]["amount"], 12.5);
    assert_eq!(items[0]["retry"], false);
    assert_eq!(items[0]["level"], "CRITICAL");
}

#[tokio::test]
async fn existing_array_is_extended_in_place() {
    let daemon = Daemon::start();
    let target = daemon.work_path().join("existing.log");
    std::fs::write(&target, "[{\"message\":\"seed\"}]\n").unwrap();

    let registry = Registry::connect(daemon.socket_path()).await.unwrap();
    registry
        .write([&target], Level::Info, "appended", None, Default::default())
        .unwrap();
    registry.flush().await.unwrap();

    let items = read_array(&target);
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["message"], "seed");
    assert_eq!(items[1]["message"], "appended");
}

#[tokio::test]
async fn deleted_file_is_recreated_with_new_records_only() {
    let daemon = Daemon::start();
    let target = daemon.work_path().join("rotated.log");

    let registry = Registry::connect(daemon.socket_path()).await.unwrap();
    let log = registry.logger([&target], "");
    log.info("before", None, Default::default()).unwrap();
    registry.flush().await.unwrap();

    std::fs::rename(&target, daemon.work_path().join("rotated.log.1")).unwrap();
    log.info("after", None, Default::default()).unwrap();
    registry.flush().await.unwrap();

    let fresh = read_array(&target);
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0]["message"], "after");

    let old = read_array(&daemon.work_path().join("rotated.log.1"));
    assert_eq!(old.len(), 1);
    assert_eq!(old[0]["message"], "before");
}

#[tokio::test]
async fn corrupt_file_is_left_untouched() {
    let daemon = Daemon::start();
    let target = daemon.work_path().join("corrupt.log");
    let good = daemon.work_path().join("good.log");
    std::fs::write(&target, "not json").unwrap();

    let registry = Registry::connect(daemon.socket_path()).await.unwrap();
    registry
        .write([&target, &good], Level::Error, "boom", None, Default::default())
        .unwrap();
    registry.flush().await.unwrap();

    assert_eq!(std::fs::read_to_string(&target).unwrap(), "not json");
    assert_eq!(read_array(&good).len(), 1);
}
