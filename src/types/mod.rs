//! Value types shared by the scope engine and its handlers.
//!
//! # Examples
//!
//! ```
//! use scope_rail::{Annotated, Panicked};
//!
//! let err = Annotated::new(Panicked::new("worker died")).with_message("draining queue");
//! assert_eq!(err.to_string(), "draining queue: scope-rail: panicked: worker died");
//! ```
use std::borrow::Cow;
use std::sync::Arc;

use smallvec::SmallVec;

pub mod abort;
pub mod annotated;
pub mod context;
pub mod panicked;

pub use abort::*;
pub use annotated::*;
pub use context::*;
pub use panicked::*;

/// Boxed trait-object error, the error type of the global default scope.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Reference-counted trait-object error.
///
/// Unlike [`BoxError`] it can be cloned, which lets a fault whose payload is a
/// `SharedError` be recorded and re-raised as the very same error.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// SmallVec-backed message stack of an [`Annotated`] error.
///
/// Two inline slots cover the usual one or two decorations without touching
/// the heap.
pub type MessageVec = SmallVec<[Cow<'static, str>; 2]>;
