//! Macros for use inside a scope.
//!
//! - [`macro@crate::ensure`] - Aborts the block with a formatted message when a
//!   condition does not hold, rendering the message only on failure.
//! - [`macro@crate::attach`] - Builds the owned handler list taken by the
//!   `defer*` registration methods.
//!
//! # Examples
//!
//! ```
//! use scope_rail::{ensure, Config};
//!
//! let result = Config::<String>::new().run(|e| {
//!     let (got, want) = (3, 4);
//!     ensure!(e, got == want, "checksum mismatch: got {got}, want {want}")?;
//!     Ok(())
//! });
//!
//! assert_eq!(result, Err("checksum mismatch: got 3, want 4".to_string()));
//! ```

/// Aborts the block with a formatted error unless the condition holds.
///
/// `ensure!(scope, cond, "format", args...)` expands to
/// [`Scope::assert_fmt`](crate::Scope::assert_fmt) and evaluates to its
/// [`Flow`](crate::Flow), so it is usually followed by `?`. The error type
/// must implement `From<String>`.
///
/// # Examples
///
/// ```
/// use scope_rail::{ensure, Config};
///
/// let result = Config::<String>::new().run(|e| {
///     ensure!(e, 1 + 1 == 2, "arithmetic is broken")?;
///     Ok("fine")
/// });
/// assert_eq!(result, Ok("fine"));
/// ```
#[macro_export]
macro_rules! ensure {
    ($scope:expr, $cond:expr, $($arg:tt)+) => {
        $scope.assert_fmt($cond, ::core::format_args!($($arg)+))
    };
}

/// Builds a list of handlers to attach to one cleanup.
///
/// `attach![h1, h2]` boxes every handler with
/// [`boxed_handler`](crate::boxed_handler); the cleanup entry then owns them,
/// so handlers may be built inline. They run in the listed order.
///
/// # Examples
///
/// ```
/// use scope_rail::{attach, handlers, Config};
///
/// let result = Config::<String>::new().run(|e| {
///     e.defer_with(
///         |_| Err("unlink".to_string()),
///         attach![handlers::message("inner"), handlers::message("outer")],
///     );
///     Ok(())
/// });
/// assert_eq!(result, Err("outer: inner: unlink".to_string()));
/// ```
#[macro_export]
macro_rules! attach {
    ($($handler:expr),* $(,)?) => {
        [$($crate::boxed_handler($handler)),*]
    };
}

/// Emits a `tracing` event when the `tracing` feature is enabled and expands
/// to nothing otherwise.
macro_rules! trace_event {
    ($level:ident, $($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        {
            ::tracing::$level!($($arg)+);
        }
    };
}

pub(crate) use trace_event;
