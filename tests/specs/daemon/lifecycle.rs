//! Daemon lifecycle specs
//!
//! Verify startup files, single-instance locking and clean shutdown.

use crate::prelude::*;
use splice::{DaemonClient, Level, Registry};

#[test]
fn startup_writes_pid_version_and_socket() {
    let daemon = Daemon::start();
    let state = daemon.state_path();

    assert!(daemon.socket_path().exists());
    let pid = std::fs::read_to_string(state.join("daemon.pid")).unwrap();
    assert_eq!(pid.trim(), daemon.pid().to_string());
    let version = std::fs::read_to_string(state.join("daemon.version")).unwrap();
    assert_eq!(version.trim(), splice_daemon::PROTOCOL_VERSION);
    assert!(daemon.daemon_log().contains("--- spliced: starting (pid: "));
}

#[test]
fn second_instance_reports_already_running() {
    let daemon = Daemon::start();

    let output = daemon.second_instance();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("spliced is already running"), "stderr: {stderr}");
    assert!(stderr.contains(&format!("pid: {}", daemon.pid())), "stderr: {stderr}");

    // The running daemon is untouched
    assert!(daemon.socket_path().exists());
}

#[tokio::test]
async fn shutdown_request_drains_and_cleans_up() {
    let mut daemon = Daemon::start();
    let target = daemon.work_path().join("out.log");

    let registry = Registry::connect(daemon.socket_path()).await.unwrap();
    registry
        .write([&target], Level::Success, "before shutdown", None, Default::default())
        .unwrap();
    registry.flush().await.unwrap();

    DaemonClient::new(daemon.socket_path()).shutdown().await.unwrap();
    assert!(daemon.wait_exit(), "{}", daemon.daemon_log());

    let state = daemon.state_path();
    assert!(!daemon.socket_path().exists());
    assert!(!state.join("daemon.pid").exists());
    assert!(!state.join("daemon.version").exists());

    let items = read_array(&target);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["level"], "SUCCESS");
}

#[test]
fn sigterm_stops_daemon_cleanly() {
    let mut daemon = Daemon::start();
    daemon.signal("TERM");
    assert!(daemon.wait_exit(), "{}", daemon.daemon_log());
    assert!(!daemon.socket_path().exists());
}

#[tokio::test]
async fn status_counts_written_records() {
    let daemon = Daemon::start();
    let target = daemon.work_path().join("count.log");

    let registry = Registry::connect(daemon.socket_path()).await.unwrap();
    let log = registry.logger([&target], "");
    for n in 0..3 {
        log.debug(format!("n={n}"), None, Default::default()).unwrap();
    }
    registry.flush().await.unwrap();

    let status = DaemonClient::new(daemon.socket_path()).status().await.unwrap();
    assert_eq!(status.records_written, 3);
    assert_eq!(status.write_failures, 0);
}
