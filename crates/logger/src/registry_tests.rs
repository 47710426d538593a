// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde_json::Value;
use splice_storage::{AppendOptions, SyncMode};
use tempfile::tempdir;

use super::*;
use crate::FakeSink;

fn registry(sink: &FakeSink) -> Registry {
    Registry::new(Arc::new(sink.clone())).with_console(None)
}

#[test]
fn same_targets_and_namespace_share_a_logger() {
    let sink = FakeSink::new();
    let registry = registry(&sink);

    let a = registry.logger(["run.log"], "app");
    let b = registry.logger(["run.log"], "app");

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(registry.len(), 1);
}

#[test]
fn duplicate_paths_collapse_into_one_key() {
    let sink = FakeSink::new();
    let registry = registry(&sink);

    let a = registry.logger(["a.log", "b.log", "a.log"], "");
    let b = registry.logger(["a.log", "b.log"], "");

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.targets(), &[PathBuf::from("a.log"), PathBuf::from("b.log")]);
}

#[test]
fn namespace_and_order_distinguish_loggers() {
    let sink = FakeSink::new();
    let registry = registry(&sink);

    let plain = registry.logger(["a.log", "b.log"], "");
    let named = registry.logger(["a.log", "b.log"], "jobs");
    let reordered = registry.logger(["b.log", "a.log"], "");

    assert!(!Arc::ptr_eq(&plain, &named));
    assert!(!Arc::ptr_eq(&plain, &reordered));
    assert_eq!(registry.len(), 3);
    assert_eq!(plain.namespace(), None);
    assert_eq!(named.namespace(), Some("jobs"));
}

#[test]
fn ad_hoc_write_reuses_cached_logger() {
    let sink = FakeSink::new();
    let registry = registry(&sink);
    assert!(registry.is_empty());

    registry
        .write(["x.log"], Level::Error, "first", None, Fields::new())
        .unwrap();
    registry
        .write(["x.log"], Level::Info, "second", None, Fields::new())
        .unwrap();

    assert_eq!(registry.len(), 1);
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].level(), Level::Error);
    assert_eq!(events[1].message(), "second");
}

#[tokio::test]
async fn local_registry_writes_json_array() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("logs/run.log");
    let registry = Registry::local(WriterConfig {
        append: AppendOptions {
            sync: SyncMode::Flush,
            ..AppendOptions::default()
        },
        ..WriterConfig::default()
    })
    .with_console(None);

    let log = registry.logger([&path], "svc");
    log.bind("component", "api").unwrap();
    for n in 0..5 {
        let fields = Fields::new().with("n", &n).unwrap();
        log.info(format!("tick {n}"), None, fields).unwrap();
    }
    registry.flush().await.unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let items: Vec<Value> = serde_json::from_str(&text).unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(items[0]["message"], "tick 0");
    assert_eq!(items[0]["namespace"], "svc");
    assert_eq!(items[0]["component"], "api");
    assert_eq!(items[4]["n"], 4);
}
