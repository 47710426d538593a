//! Test helpers for behavioral specifications.
//!
//! Starts isolated `spliced` instances and reads back JSON-array log files.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};

use serde_json::Value;

// Polling timeouts
pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 2000;

/// Returns the path to a binary, checking llvm-cov target directory first.
/// Falls back to resolving relative to the test binary itself when
/// CARGO_MANIFEST_DIR is stale.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    // The test binary lives at target/debug/deps/specs-<hash>
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

/// Returns the path to the spliced daemon binary.
pub fn spliced_binary() -> PathBuf {
    binary_path("spliced")
}

/// Command for spliced with an isolated state directory
pub fn spliced_cmd(state_dir: &Path) -> Command {
    let mut cmd = Command::new(spliced_binary());
    cmd.env("SPLICE_STATE_DIR", state_dir)
        .env("SPLICE_CONSOLE", "0")
        .env_remove("SPLICE_SOCKET");
    cmd
}

/// Poll a condition until it returns true or timeout is reached.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);
    let poll_interval = std::time::Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

/// Parse a log file that must hold a single JSON array.
pub fn read_array(path: &Path) -> Vec<Value> {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("{} is not a JSON array: {e}\n{text}", path.display()))
}

/// A running spliced process with its own state directory.
///
/// Killed on drop if still running.
pub struct Daemon {
    state_dir: tempfile::TempDir,
    work_dir: tempfile::TempDir,
    child: Option<Child>,
}

impl Daemon {
    /// Start spliced and block until it prints READY.
    pub fn start() -> Self {
        let state_dir = tempfile::tempdir().unwrap();
        let work_dir = tempfile::tempdir().unwrap();
        let child = spawn_ready(state_dir.path());
        Self {
            state_dir,
            work_dir,
            child: Some(child),
        }
    }

    pub fn state_path(&self) -> &Path {
        self.state_dir.path()
    }

    /// Scratch directory for log targets
    pub fn work_path(&self) -> &Path {
        self.work_dir.path()
    }

    pub fn socket_path(&self) -> PathBuf {
        self.state_path().join("daemon.sock")
    }

    pub fn pid(&self) -> u32 {
        self.child.as_ref().map(Child::id).unwrap()
    }

    /// Read the daemon's own diagnostic log (for debugging test failures)
    pub fn daemon_log(&self) -> String {
        std::fs::read_to_string(self.state_path().join("daemon.log"))
            .unwrap_or_else(|_| "(no daemon log)".to_string())
    }

    /// Run a second spliced against the same state directory.
    pub fn second_instance(&self) -> Output {
        spliced_cmd(self.state_path()).output().unwrap()
    }

    /// Send a signal with kill(1).
    pub fn signal(&self, name: &str) {
        let status = Command::new("kill")
            .args([format!("-{name}"), self.pid().to_string()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .unwrap();
        assert!(status.success(), "kill -{name} failed");
    }

    /// Wait for the process to exit and return whether it exited cleanly.
    pub fn wait_exit(&mut self) -> bool {
        let mut child = self.child.take().unwrap();
        let exited = wait_for(SPEC_WAIT_MAX_MS * 3, || {
            matches!(child.try_wait(), Ok(Some(_)))
        });
        if !exited {
            let _ = child.kill();
            panic!("spliced did not exit\n{}", self.daemon_log());
        }
        child.wait().map(|s| s.success()).unwrap_or(false)
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn spawn_ready(state_dir: &Path) -> Child {
    let mut child = spliced_cmd(state_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let stdout = child.stdout.take().unwrap();
    let mut line = String::new();
    BufReader::new(stdout).read_line(&mut line).unwrap();
    assert_eq!(line.trim(), "READY", "spliced did not report READY");
    child
}
