//! Conditional logging module for development builds
//!
//! The `dev_log!` macro provides informational logging that is compiled out
//! in production (release) builds by default. Errors and warnings should continue
//! using `log::error!` and `log::warn!` directly.
//!
//! Logging is enabled when either:
//! - Building in debug mode (`cfg(debug_assertions)`)
//! - The `console_logging` feature is explicitly enabled
//!
//! # Examples
//!
//! ```ignore
//! route_desk::dev_log!("Rebuilt timeline: {} items", 3);
//! ```

/// Conditionally log through the `log` facade in development builds
///
/// This macro expands to `log::debug!` in debug builds or when the
/// `console_logging` feature is enabled. In production release builds,
/// it compiles to nothing (zero overhead).
#[macro_export]
macro_rules! dev_log {
    ($($arg:expr),+ $(,)?) => {
        #[cfg(any(debug_assertions, feature = "console_logging"))]
        {
            ::log::debug!("{}", format!($($arg),+));
        }
    };
}
