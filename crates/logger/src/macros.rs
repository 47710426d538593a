// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Call-site capturing macros.
//!
//! ```ignore
//! let log = registry.logger(["logs/run.log"], "billing");
//! splice::info!(log, "invoice sent", invoice = 42, retries = 0)?;
//! ```

/// Source location of the macro invocation, including the enclosing
/// function's name.
#[macro_export]
macro_rules! call_site {
    () => {{
        fn __marker() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::CallSite::new(
            ::std::module_path!(),
            $crate::function_name(__type_name_of(__marker)),
            ::std::file!(),
            ::std::line!(),
        )
    }};
}

/// Build [`Fields`](crate::Fields) from `key => value` pairs.
///
/// Evaluates to `Result<Fields, FormatError>`; the first value that cannot
/// be represented as JSON stops the build.
#[macro_export]
macro_rules! fields {
    () => {
        ::std::result::Result::<$crate::Fields, $crate::FormatError>::Ok($crate::Fields::new())
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut __fields = $crate::Fields::new();
        let mut __result: ::std::result::Result<(), $crate::FormatError> = Ok(());
        $(
            if __result.is_ok() {
                __result = __fields.insert($key, &$value);
            }
        )+
        __result.map(|()| __fields)
    }};
}

/// Log at an explicit level: `log!(logger, Level::Info, "msg", key = value)`.
///
/// Evaluates to `Result<(), LogError>`.
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $message:expr $(, $key:ident = $value:expr)*) => {{
        let mut __fields = $crate::Fields::new();
        let mut __result: ::std::result::Result<(), $crate::FormatError> = Ok(());
        $(
            if __result.is_ok() {
                __result = __fields.insert(::std::stringify!($key), &$value);
            }
        )*
        match __result {
            Ok(()) => $logger.log($level, $message, Some($crate::call_site!()), __fields),
            Err(e) => Err($crate::LogError::from(e)),
        }
    }};
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $message:expr $(, $key:ident = $value:expr)*) => {
        $crate::log!($logger, $crate::Level::Debug, $message $(, $key = $value)*)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $message:expr $(, $key:ident = $value:expr)*) => {
        $crate::log!($logger, $crate::Level::Info, $message $(, $key = $value)*)
    };
}

#[macro_export]
macro_rules! success {
    ($logger:expr, $message:expr $(, $key:ident = $value:expr)*) => {
        $crate::log!($logger, $crate::Level::Success, $message $(, $key = $value)*)
    };
}

#[macro_export]
macro_rules! warning {
    ($logger:expr, $message:expr $(, $key:ident = $value:expr)*) => {
        $crate::log!($logger, $crate::Level::Warning, $message $(, $key = $value)*)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $message:expr $(, $key:ident = $value:expr)*) => {
        $crate::log!($logger, $crate::Level::Error, $message $(, $key = $value)*)
    };
}

#[macro_export]
macro_rules! critical {
    ($logger:expr, $message:expr $(, $key:ident = $value:expr)*) => {
        $crate::log!($logger, $crate::Level::Critical, $message $(, $key = $value)*)
    };
}

#[cfg(test)]
#[path = "macros_tests.rs"]
mod tests;
