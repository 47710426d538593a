// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serial_test::serial;

use super::*;

#[test]
#[serial]
fn explicit_socket_wins() {
    std::env::set_var("SPLICE_SOCKET", "/tmp/custom.sock");
    std::env::set_var("SPLICE_STATE_DIR", "/tmp/state");

    let path = socket_path();

    std::env::remove_var("SPLICE_SOCKET");
    std::env::remove_var("SPLICE_STATE_DIR");
    assert_eq!(path, Some(PathBuf::from("/tmp/custom.sock")));
}

#[test]
#[serial]
fn socket_defaults_to_state_dir() {
    std::env::remove_var("SPLICE_SOCKET");
    std::env::set_var("SPLICE_STATE_DIR", "/tmp/state");

    let path = socket_path();

    std::env::remove_var("SPLICE_STATE_DIR");
    assert_eq!(path, Some(PathBuf::from("/tmp/state/daemon.sock")));
}

#[test]
#[serial]
fn console_toggle() {
    let cases = [
        (None, true),
        (Some("0"), false),
        (Some("off"), false),
        (Some("1"), true),
        (Some(""), true),
    ];

    for (value, expected) in cases {
        match value {
            Some(v) => std::env::set_var("SPLICE_CONSOLE", v),
            None => std::env::remove_var("SPLICE_CONSOLE"),
        }
        let enabled = console_enabled();
        std::env::remove_var("SPLICE_CONSOLE");
        assert_eq!(enabled, expected, "SPLICE_CONSOLE={value:?}");
    }
}
