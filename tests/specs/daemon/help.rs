//! spliced --help / --version specs

use crate::prelude::*;
use splice_daemon::PROTOCOL_VERSION;

#[test]
fn version_flag_prints_version() {
    let output = assert_cmd::Command::new(spliced_binary())
        .arg("--version")
        .assert()
        .success()
        .get_output()
        .clone();
    similar_asserts::assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        format!("spliced {PROTOCOL_VERSION}\n")
    );
}

#[test]
fn help_flag_describes_usage() {
    let output = assert_cmd::Command::new(spliced_binary())
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .clone();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("USAGE:"), "stdout: {stdout}");
    assert!(stdout.contains("daemon.sock"), "stdout: {stdout}");
}

#[test]
fn unknown_argument_fails() {
    let output = assert_cmd::Command::new(spliced_binary())
        .arg("--bogus")
        .assert()
        .failure()
        .get_output()
        .clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unexpected argument '--bogus'"), "stderr: {stderr}");
}
