//! Errors decorated with a stack of human-readable messages.
//!
//! [`Annotated`] is what the [`message`](crate::handlers::message) handler
//! produces: the original error stays untouched at the core and every handler
//! that decorates it pushes one more message on top.
use core::any::Any;
use core::fmt;
use std::borrow::Cow;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::{BoxError, FromPanic, MessageVec, SharedError};

/// Error wrapper that stores the original error plus the messages attached to it.
///
/// Messages are kept in the order they were added; `Display` prints the most
/// recent one first, so the output reads from the outermost operation down to
/// the root cause.
///
/// # Examples
///
/// ```
/// use scope_rail::Annotated;
///
/// let err = Annotated::new("connection refused")
///     .with_message("dialing primary")
///     .with_message("opening client");
///
/// assert_eq!(err.to_string(), "opening client: dialing primary: connection refused");
/// assert_eq!(err.core(), &"connection refused");
/// ```
#[must_use]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotated<E> {
    core: E,
    messages: MessageVec,
    code: Option<u32>,
}

impl<E> Annotated<E> {
    /// Wraps an error without any messages.
    #[inline]
    pub fn new(core: E) -> Self {
        Self { core, messages: MessageVec::new(), code: None }
    }

    /// Pushes one more message on top of the existing ones.
    #[inline]
    pub fn with_message<M>(mut self, message: M) -> Self
    where
        M: Into<Cow<'static, str>>,
    {
        self.messages.push(message.into());
        self
    }

    /// Attaches a numeric code, replacing any previous one.
    #[inline]
    pub fn with_code(mut self, code: u32) -> Self {
        self.code = Some(code);
        self
    }

    /// The numeric code, if one was attached.
    #[inline]
    pub fn code(&self) -> Option<u32> {
        self.code
    }

    /// Returns the wrapped error.
    #[inline]
    pub fn core(&self) -> &E {
        &self.core
    }

    /// Consumes the wrapper, returning the wrapped error.
    #[inline]
    pub fn into_core(self) -> E {
        self.core
    }

    /// Iterates over the messages, most recent first.
    #[inline]
    pub fn messages(&self) -> impl Iterator<Item = &str> + '_ {
        self.messages.iter().rev().map(|m| m.as_ref())
    }

    /// Maps the wrapped error while keeping the messages.
    #[inline]
    pub fn map_core<F, T>(self, f: F) -> Annotated<T>
    where
        F: FnOnce(E) -> T,
    {
        Annotated { core: f(self.core), messages: self.messages, code: self.code }
    }
}

impl<E: fmt::Display> fmt::Display for Annotated<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for message in self.messages() {
            write!(f, "{}: ", message)?;
        }
        write!(f, "{}", self.core)?;
        if let Some(code) = self.code {
            write!(f, " (code: {})", code)?;
        }
        Ok(())
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for Annotated<E> {}

impl<E: FromPanic> FromPanic for Annotated<E> {
    #[inline]
    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        Annotated::new(E::from_panic(payload))
    }
}

/// Error types that can carry an extra message.
///
/// Implemented for [`Annotated`], for `String` (the message becomes a prefix)
/// and for the boxed and shared trait-object errors (wrapped in an
/// [`Annotated`]). Handlers that decorate errors are generic over this trait.
pub trait Annotate: Sized {
    /// Returns the error with `message` attached.
    fn annotate(self, message: Cow<'static, str>) -> Self;
}

impl<E> Annotate for Annotated<E> {
    #[inline]
    fn annotate(self, message: Cow<'static, str>) -> Self {
        self.with_message(message)
    }
}

impl Annotate for String {
    fn annotate(self, message: Cow<'static, str>) -> Self {
        format!("{}: {}", message, self)
    }
}

impl Annotate for BoxError {
    fn annotate(self, message: Cow<'static, str>) -> Self {
        Box::new(Annotated::new(self).with_message(message))
    }
}

impl Annotate for SharedError {
    fn annotate(self, message: Cow<'static, str>) -> Self {
        Arc::new(Annotated::new(self).with_message(message))
    }
}
