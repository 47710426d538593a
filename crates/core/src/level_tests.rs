// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    debug         = { "debug",    Level::Debug },
    info_upper    = { "INFO",     Level::Info },
    success_mixed = { "Success",  Level::Success },
    warning       = { "warning",  Level::Warning },
    warn_alias    = { "WARN",     Level::Warning },
    error_padded  = { " error ",  Level::Error },
    critical      = { "critical", Level::Critical },
)]
fn parse(input: &str, expected: Level) {
    assert_eq!(input.parse::<Level>().unwrap(), expected);
}

#[test]
fn parse_unknown_level_fails() {
    let err = "verbose".parse::<Level>().unwrap_err();
    assert_eq!(err, UnknownLevel("verbose".to_string()));
    assert_eq!(err.to_string(), "unknown log level: verbose");
}

#[test]
fn display_matches_serialized_name() {
    for level in Level::ALL {
        let json = serde_json::to_string(&level).unwrap();
        assert_eq!(json, format!("\"{}\"", level));
    }
}

#[test]
fn ordering_follows_severity() {
    assert!(Level::Debug < Level::Info);
    assert!(Level::Info < Level::Success);
    assert!(Level::Success < Level::Warning);
    assert!(Level::Error < Level::Critical);
}
