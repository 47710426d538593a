//! Concurrent producer specs
//!
//! Separate processes log to one shared file through the daemon; the file
//! must end up as one valid array holding every record.

use std::process::{Command, Stdio};

use crate::prelude::*;
use splice::Registry;

const SOCKET_VAR: &str = "SPLICE_SPEC_SOCKET";
const TARGET_VAR: &str = "SPLICE_SPEC_TARGET";
const PRODUCER_VAR: &str = "SPLICE_SPEC_PRODUCER";

/// Body of each child process. Does nothing unless launched by
/// [`ten_processes_share_one_array`].
#[tokio::test]
#[ignore = "runs inside child processes"]
async fn producer_process() {
    let (Ok(socket), Ok(target), Ok(id)) = (
        std::env::var(SOCKET_VAR),
        std::env::var(TARGET_VAR),
        std::env::var(PRODUCER_VAR),
    ) else {
        return;
    };

    let registry = Registry::connect(socket).await.unwrap();
    let log = registry.logger([target], "producers");
    splice::info!(log, "worker started", producer = id).unwrap();
    splice::error!(log, "worker failed", producer = id).unwrap();
    registry.flush().await.unwrap();
}

#[test]
fn ten_processes_share_one_array() {
    let daemon = Daemon::start();
    let target = daemon.work_path().join("logs/run.log");
    let exe = std::env::current_exe().unwrap();

    let children: Vec<_> = (0..10)
        .map(|id| {
            Command::new(&exe)
                .args([
                    "logging_concurrency::producer_process",
                    "--exact",
                    "--ignored",
                    "--nocapture",
                ])
                .env(SOCKET_VAR, daemon.socket_path())
                .env(TARGET_VAR, &target)
                .env(PRODUCER_VAR, id.to_string())
                .env("SPLICE_CONSOLE", "0")
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .spawn()
                .unwrap()
        })
        .collect();

    for child in children {
        let output = child.wait_with_output().unwrap();
        assert!(
            output.status.success(),
            "producer failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let items = read_array(&target);
    assert_eq!(items.len(), 20, "{}", daemon.daemon_log());
    let infos = items.iter().filter(|i| i["level"] == "INFO").count();
    let errors = items.iter().filter(|i| i["level"] == "ERROR").count();
    assert_eq!((infos, errors), (10, 10));

    // Each producer's own records stay in submission order
    for id in 0..10 {
        let id = id.to_string();
        let levels: Vec<_> = items
            .iter()
            .filter(|i| i["producer"] == id.as_str())
            .map(|i| i["level"].as_str().unwrap())
            .collect();
        assert_eq!(levels, ["INFO", "ERROR"]);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_tasks_in_one_process_fan_into_many_files() {
    let daemon = Daemon::start();
    let registry = std::sync::Arc::new(Registry::connect(daemon.socket_path()).await.unwrap());
    let shared = daemon.work_path().join("shared.log");

    let mut tasks = Vec::new();
    for n in 0..8 {
        let registry = std::sync::Arc::clone(&registry);
        let shared = shared.clone();
        let own = daemon.work_path().join(format!("task-{n}.log"));
        tasks.push(tokio::spawn(async move {
            let log = registry.logger([&shared, &own], "");
            for seq in 0..25 {
                splice::warning!(log, "tick", task = n, seq = seq).unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    registry.flush().await.unwrap();

    assert_eq!(read_array(&shared).len(), 200);
    for n in 0..8 {
        let own = read_array(&daemon.work_path().join(format!("task-{n}.log")));
        let seqs: Vec<_> = own.iter().map(|i| i["seq"].as_u64().unwrap()).collect();
        assert_eq!(seqs, (0..25).collect::<Vec<u64>>());
    }
}
