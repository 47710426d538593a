// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source location of a log call.
//!
//! Captured at compile time by the `call_site!` macro in the `splice` crate;
//! nothing here inspects the stack at runtime.

use serde::{Deserialize, Serialize};

/// Where a log call was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    /// Rust module path (`module_path!()`).
    pub module: String,
    /// Name of the enclosing function.
    pub function: String,
    /// Source file (`file!()`).
    pub file: String,
    pub line: u32,
}

impl CallSite {
    pub fn new(
        module: impl Into<String>,
        function: impl Into<String>,
        file: impl Into<String>,
        line: u32,
    ) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
            file: file.into(),
            line,
        }
    }
}

/// Extract the enclosing function name from the type name of a marker item
/// declared inside it.
///
/// `"app::server::handle::{{closure}}::__marker"` becomes `"handle"`.
pub fn function_name(marker_type_name: &str) -> &str {
    let mut name = marker_type_name
        .rsplit_once("::")
        .map(|(head, _)| head)
        .unwrap_or(marker_type_name);
    while let Some(head) = name.strip_suffix("::{{closure}}") {
        name = head;
    }
    name.rsplit("::").next().unwrap_or(name)
}

#[cfg(test)]
#[path = "call_site_tests.rs"]
mod tests;
