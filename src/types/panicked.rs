//! Conversion of panic payloads into error values.
//!
//! A panic escaping a block is an uncontrolled fault. The scope records it as
//! its pending error before draining cleanups, so the payload has to be turned
//! into the block's error type first; [`FromPanic`] is that conversion.
use core::any::Any;
use core::fmt;
use std::io;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::{BoxError, SharedError};

/// Prefix attached to the message of every recovered fault.
pub const PANIC_MARKER: &str = "scope-rail: panicked: ";

/// A recovered panic, expressed as an error.
///
/// `Display` renders the payload's text behind [`PANIC_MARKER`], so a fault
/// that ends up in logs is never confused with an ordinary failure.
///
/// # Examples
///
/// ```
/// use scope_rail::Panicked;
///
/// let payload: Box<dyn std::any::Any + Send> = Box::new("disk on fire");
/// let err = Panicked::from_payload(&*payload);
///
/// assert_eq!(err.message(), "disk on fire");
/// assert_eq!(err.to_string(), "scope-rail: panicked: disk on fire");
/// ```
#[must_use]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Panicked {
    message: String,
}

impl Panicked {
    /// Creates a recovered fault with the given message.
    #[inline]
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self { message: message.into() }
    }

    /// Extracts a textual description from a panic payload.
    ///
    /// String payloads (what `panic!` produces) are used verbatim, error
    /// payloads contribute their `Display` output, and anything else is
    /// described by a fixed placeholder.
    pub fn from_payload(payload: &(dyn Any + Send)) -> Self {
        if let Some(panicked) = payload.downcast_ref::<Panicked>() {
            return panicked.clone();
        }
        if let Some(message) = payload.downcast_ref::<&'static str>() {
            return Self::new(*message);
        }
        if let Some(message) = payload.downcast_ref::<String>() {
            return Self::new(message.as_str());
        }
        if let Some(err) = payload.downcast_ref::<BoxError>() {
            return Self::new(err.to_string());
        }
        if let Some(err) = payload.downcast_ref::<SharedError>() {
            return Self::new(err.to_string());
        }
        Self::new("Box<dyn Any>")
    }

    /// Returns the payload text without the marker.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Panicked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", PANIC_MARKER, self.message)
    }
}

impl std::error::Error for Panicked {}

/// Conversion from a panic payload into a block's error type.
///
/// Required by [`Config::run`](crate::Config::run) so a fault can be recorded
/// as the pending error while cleanups drain. Implementations should reuse the
/// payload when it already is an error of the right type and fall back to
/// [`Panicked::from_payload`] otherwise.
///
/// # Examples
///
/// ```
/// use scope_rail::{FromPanic, Panicked};
///
/// #[derive(Debug, Clone, PartialEq)]
/// enum AppError {
///     Io(String),
///     Crashed(Panicked),
/// }
///
/// impl FromPanic for AppError {
///     fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
///         match payload.downcast_ref::<AppError>() {
///             Some(err) => err.clone(),
///             None => AppError::Crashed(Panicked::from_payload(payload)),
///         }
///     }
/// }
///
/// let payload: Box<dyn std::any::Any + Send> = Box::new(AppError::Io("eof".into()));
/// assert_eq!(AppError::from_panic(&*payload), AppError::Io("eof".into()));
/// ```
pub trait FromPanic: Sized {
    /// Builds an error describing the given panic payload.
    fn from_panic(payload: &(dyn Any + Send)) -> Self;
}

impl FromPanic for Panicked {
    #[inline]
    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        Panicked::from_payload(payload)
    }
}

impl FromPanic for String {
    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        Panicked::from_payload(payload).to_string()
    }
}

impl FromPanic for BoxError {
    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        match payload.downcast_ref::<SharedError>() {
            Some(shared) => Box::new(Arc::clone(shared)),
            None => Box::new(Panicked::from_payload(payload)),
        }
    }
}

impl FromPanic for SharedError {
    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        match payload.downcast_ref::<SharedError>() {
            Some(shared) => Arc::clone(shared),
            None => Arc::new(Panicked::from_payload(payload)),
        }
    }
}

/// The fault is carried as the error's inner [`Panicked`] with kind
/// [`io::ErrorKind::Other`].
impl FromPanic for io::Error {
    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        io::Error::new(io::ErrorKind::Other, Panicked::from_payload(payload))
    }
}
