//! Built-in handlers.
//!
//! - [`Discard`]: drops the error, the block carries on
//! - [`Fatal`]: terminates the process
//! - [`Message`]: attaches a message through [`Annotate`]
//! - [`Inspect`]: observes the error and passes it on
//! - `Log` / `SpanMessage` (feature `tracing`): emit the error as a tracing
//!   event, attach the current span's name
//!
//! # Examples
//!
//! ```
//! use std::cell::Cell;
//! use scope_rail::{handlers, Config};
//!
//! let seen = Cell::new(0);
//! let count = handlers::inspect(|_, _: &String| seen.set(seen.get() + 1));
//!
//! let result = Config::<String>::new().run(|e| {
//!     e.fail_now_with(Some("first".into()), &[&count, &handlers::Discard])?;
//!     e.fail_now_with(Some("second".into()), &[&count])?;
//!     Ok(())
//! });
//!
//! assert_eq!(result, Err("second".to_string()));
//! assert_eq!(seen.get(), 2);
//! ```

use std::borrow::Cow;

use crate::macros::trace_event;
use crate::scope::ScopeState;
use crate::traits::Handler;
use crate::types::Annotate;

#[cfg(feature = "tracing")]
mod log;

#[cfg(feature = "tracing")]
pub use self::log::{log, span_message, Log, SpanMessage};

/// Process exit status used by [`Fatal`].
pub const FATAL_EXIT_CODE: i32 = 1;

/// Discards every error, so normal control flow resumes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Discard;

impl<E> Handler<E> for Discard {
    #[inline]
    fn handle(&self, _state: &ScopeState<'_, E>, _err: E) -> Option<E> {
        None
    }
}

/// Terminates the process with [`FATAL_EXIT_CODE`].
///
/// Cleanups do not run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fatal;

impl<E> Handler<E> for Fatal {
    fn handle(&self, _state: &ScopeState<'_, E>, _err: E) -> Option<E> {
        trace_event!(error, exit_code = FATAL_EXIT_CODE, "fatal error, terminating process");
        std::process::exit(FATAL_EXIT_CODE)
    }
}

/// Attaches a fixed message to every error it sees.
///
/// Created by [`message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    message: Cow<'static, str>,
}

impl Message {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.message
    }
}

impl<E: Annotate> Handler<E> for Message {
    #[inline]
    fn handle(&self, _state: &ScopeState<'_, E>, err: E) -> Option<E> {
        Some(err.annotate(self.message.clone()))
    }
}

/// Handler that decorates errors with `message`.
///
/// # Examples
///
/// ```
/// use scope_rail::{handlers, Config};
///
/// let result = Config::<String>::new().run(|e| {
///     e.fail_now_with(Some("timeout".into()), &[&handlers::message("fetching index")])
/// });
/// assert_eq!(result, Err("fetching index: timeout".to_string()));
/// ```
#[inline]
pub fn message<M>(message: M) -> Message
where
    M: Into<Cow<'static, str>>,
{
    Message { message: message.into() }
}

/// Calls a closure with every error and passes the error on unchanged.
///
/// Created by [`inspect`].
#[derive(Clone, Copy)]
pub struct Inspect<F> {
    f: F,
}

impl<E, F> Handler<E> for Inspect<F>
where
    F: Fn(&ScopeState<'_, E>, &E),
{
    #[inline]
    fn handle(&self, state: &ScopeState<'_, E>, err: E) -> Option<E> {
        (self.f)(state, &err);
        Some(err)
    }
}

/// Handler that shows every error to `f`.
#[inline]
pub fn inspect<E, F>(f: F) -> Inspect<F>
where
    F: Fn(&ScopeState<'_, E>, &E),
{
    Inspect { f }
}
