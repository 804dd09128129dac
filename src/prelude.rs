//! Convenience re-exports for common usage patterns.
//!
//! ```
//! use scope_rail::prelude::*;
//! ```
//!
//! # What's Included
//!
//! - **Macros**: [`ensure!`], [`attach!`]
//! - **Types**: [`Config`], [`Scope`], [`ScopeState`], [`Flow`], [`Context`],
//!   [`Annotated`], [`Panicked`], [`BoxError`]
//! - **Traits**: [`Handler`], [`Close`], [`Unlock`], [`Annotate`], [`FromPanic`]
//! - **Handlers**: [`Discard`], [`Fatal`], [`handler_fn`]
//!
//! # Examples
//!
//! ```
//! use scope_rail::prelude::*;
//!
//! fn parse_port(raw: &str) -> Result<u16, BoxError> {
//!     scope_rail::run(|e| {
//!         let port: u16 = e.must(raw.trim().parse::<u16>())?;
//!         ensure!(e, port != 0, "port must be non-zero")?;
//!         Ok(port)
//!     })
//! }
//!
//! assert_eq!(parse_port(" 8080 ").unwrap(), 8080);
//! assert!(parse_port("0").is_err());
//! assert!(parse_port("http").is_err());
//! ```

pub use crate::{attach, ensure};
pub use crate::handlers::{Discard, Fatal};
pub use crate::traits::{handler_fn, Close, Handler, Unlock};
pub use crate::types::{Annotate, Annotated, BoxError, Context, Flow, FromPanic, Panicked};
pub use crate::{Config, Scope, ScopeState};
