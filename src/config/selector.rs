//! Ready-made cleanup selectors for [`ConfigBuilder::cleanup_selector`].
//!
//! [`ConfigBuilder::cleanup_selector`]: crate::ConfigBuilder::cleanup_selector
//!
//! # Examples
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use scope_rail::{selector, Config};
//!
//! struct TempDir(Rc<Cell<bool>>);
//!
//! let config = Config::<String>::builder()
//!     .cleanup_selector(selector::with(|_, dir: TempDir| -> Result<(), String> {
//!         dir.0.set(true);
//!         Ok(())
//!     }))
//!     .build();
//!
//! let removed = Rc::new(Cell::new(false));
//! let dir = TempDir(Rc::clone(&removed));
//! config.run(|e| {
//!     e.defer_any(dir, []);
//!     Ok(())
//! }).unwrap();
//!
//! assert!(removed.get());
//! ```

use core::any::Any;
use std::sync::Arc;

use crate::config::Selector;
use crate::scope::cleanup::{closing, unlocking};
use crate::scope::{into_cleanup, ScopeState};
use crate::traits::{Close, Unlock};

/// Selects values of type `T` and closes them with [`Close`].
pub fn close<T, E>() -> Selector<E>
where
    T: Close<E> + 'static,
    E: 'static,
{
    Box::new(|value: Box<dyn Any>| value.downcast::<T>().map(|resource| closing(*resource)))
}

/// Selects values of type `T` and releases them with [`Unlock`].
pub fn unlock<T, E>() -> Selector<E>
where
    T: Unlock + 'static,
    E: 'static,
{
    Box::new(|value: Box<dyn Any>| value.downcast::<T>().map(|guard| unlocking(*guard)))
}

/// Selects values of type `T` and cleans them up with `f`.
pub fn with<T, E, F>(f: F) -> Selector<E>
where
    T: 'static,
    E: 'static,
    F: Fn(&ScopeState<'_, E>, T) -> Result<(), E> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    Box::new(move |value: Box<dyn Any>| {
        value.downcast::<T>().map(|target| {
            let f = Arc::clone(&f);
            into_cleanup(move |state: &ScopeState<'_, E>| f(state, *target))
        })
    })
}
