//! Structured error and cleanup coordination for sequential blocks.
//!
//! A block runs inside a [`Scope`]. Fallible steps are checked through the
//! scope, cleanups are registered with it, and whatever way the block ends
//! (falling through, aborting on an error, panicking) the scope:
//!
//! - runs every registered cleanup, newest first;
//! - reports the first error that survived its handler chain;
//! - sends cleanup errors through the same handlers as body errors;
//! - re-raises a panic only after cleanup is complete.
//!
//! Each submodule re-exports its public surface from here, so consumers can
//! depend on `scope_rail::*` or pick focused pieces as needed.
//!
//! # Examples
//!
//! ## Cleanup on every path
//!
//! ```
//! use std::io::{BufWriter, Write};
//! use scope_rail::Config;
//!
//! let config = Config::<std::io::Error>::new();
//! let mut sink = Vec::new();
//!
//! let written = config.run(|e| {
//!     let mut out = BufWriter::new(&mut sink);
//!     e.must(out.write_all(b"header\n"))?;
//!     e.defer_close(out);
//!     Ok(7)
//! });
//!
//! assert_eq!(written.unwrap(), 7);
//! assert_eq!(sink, b"header\n");
//! ```
//!
//! ## Default handlers
//!
//! ```
//! use scope_rail::{handlers, Annotated, Config};
//!
//! let config = Config::<Annotated<String>>::builder()
//!     .default_handler(handlers::message("syncing mirror"))
//!     .build();
//!
//! let result = config.run(|e| {
//!     e.defer(|_| Err(Annotated::new("unlink failed".to_string())));
//!     e.fail_now(Some(Annotated::new("fetch failed".to_string())))
//! });
//!
//! // The first error wins; the cleanup error was handled and dropped.
//! assert_eq!(result.unwrap_err().to_string(), "syncing mirror: fetch failed");
//! ```
//!
//! ## Panics
//!
//! ```
//! use std::cell::Cell;
//! use std::panic::{self, AssertUnwindSafe};
//! use scope_rail::Config;
//!
//! let released = Cell::new(false);
//! let config = Config::<String>::new();
//!
//! let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
//!     config.run(|e| -> scope_rail::Flow {
//!         e.defer_call(|| released.set(true));
//!         panic!("index out of range");
//!     })
//! }));
//!
//! assert!(outcome.is_err());
//! assert!(released.get());
//! ```

/// Reusable configurations: default handlers and cleanup selectors
pub mod config;
/// Built-in error handlers
pub mod handlers;
/// Macros used inside a scope
pub mod macros;
/// Convenience re-exports for quick starts
pub mod prelude;
/// The execution-scope engine and its cleanup registry
pub mod scope;
/// Handler, cleanup and conversion traits
pub mod traits;
/// Abort signal, recovered panics and decorated errors
pub mod types;

use std::sync::OnceLock;

pub use config::{selector, Config, ConfigBuilder, DefaultHandler, Selector};
pub use scope::{into_cleanup, Cleanup, Phase, Scope, ScopeState};
pub use traits::*;
pub use types::*;

/// The process-wide configuration used by [`run`] and [`run_with_context`].
///
/// It has no default handlers and no custom selectors, and is built on first
/// use.
pub fn default_config() -> &'static Config<BoxError> {
    static DEFAULT: OnceLock<Config<BoxError>> = OnceLock::new();
    DEFAULT.get_or_init(Config::new)
}

/// Runs `f` in a new scope of the default configuration.
///
/// # Examples
///
/// ```
/// let result = scope_rail::run(|e| {
///     let n: i32 = e.must("42".parse::<i32>())?;
///     Ok(n * 2)
/// });
/// assert_eq!(result.unwrap(), 84);
/// ```
pub fn run<'s, T, F>(f: F) -> Result<T, BoxError>
where
    F: FnOnce(&mut Scope<'s, BoxError>) -> Flow<T>,
{
    default_config().run(f)
}

/// Runs `f` in a new scope of the default configuration under `context`.
pub fn run_with_context<'s, T, F>(context: Context, f: F) -> Result<T, BoxError>
where
    F: FnOnce(&mut Scope<'s, BoxError>) -> Flow<T>,
{
    default_config().run_with_context(context, f)
}
