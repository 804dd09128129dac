//! Core traits for error handling and cleanup.
//!
//! - [`Handler`]: processes an error raised inside a scope
//! - [`Close`] / [`Unlock`]: cleanup capabilities for typed registration
//! - [`Annotate`](crate::types::Annotate) and [`FromPanic`](crate::types::FromPanic)
//!   live next to the error types they convert
//!
//! # Examples
//!
//! ```
//! use scope_rail::{handler_fn, Config};
//!
//! let config = Config::<String>::builder()
//!     .default_handler(handler_fn(|_, err: String| Some(format!("{err}!"))))
//!     .build();
//!
//! assert_eq!(config.run(|e| e.fail_now(Some("boom".to_string()))), Err("boom!".to_string()));
//! ```

pub mod close;
pub mod handler;

pub use close::{Close, Unlock};
pub use handler::{apply_chain, boxed_handler, handler_fn, BoxHandler, Handler, HandlerFn};
