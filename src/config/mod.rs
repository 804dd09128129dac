//! Reusable scope configuration.
//!
//! A [`Config`] holds the default handler chain applied at every error site
//! that does not list its own handlers, and the cleanup selectors consulted
//! by [`Scope::defer_any`](crate::Scope::defer_any). It is immutable once
//! built and can be shared by any number of block executions, sequential or
//! concurrent; each execution gets a fresh [`Scope`].
//!
//! # Examples
//!
//! ```
//! use scope_rail::{handlers, Annotated, Config};
//!
//! let config = Config::<Annotated<String>>::builder()
//!     .default_handler(handlers::message("loading settings"))
//!     .build();
//!
//! let result = config.run(|e| {
//!     e.must(Err::<(), _>(Annotated::new("missing key".to_string())))?;
//!     Ok(())
//! });
//!
//! assert_eq!(result.unwrap_err().to_string(), "loading settings: missing key");
//! ```

use core::any::Any;
use core::fmt;

use crate::scope::cleanup::builtin_selector;
use crate::scope::{Cleanup, Scope, ScopeState};
use crate::traits::{handler_fn, Handler};
use crate::types::{Context, Flow, FromPanic};

pub mod selector;

/// A boxed default handler.
pub type DefaultHandler<E> = Box<dyn Handler<E> + Send + Sync>;

/// Maps a value passed to [`Scope::defer_any`](crate::Scope::defer_any) to a
/// cleanup, or hands it back untouched when the selector does not apply.
///
/// See [`selector`] for ready-made selectors.
pub type Selector<E> =
    Box<dyn Fn(Box<dyn Any>) -> Result<Cleanup<'static, E>, Box<dyn Any>> + Send + Sync>;

/// Default handlers and cleanup selectors shared by block executions.
pub struct Config<E> {
    defaults: Vec<DefaultHandler<E>>,
    selectors: Vec<Selector<E>>,
}

impl<E> Config<E> {
    /// A configuration without default handlers or custom selectors.
    #[inline]
    pub const fn new() -> Self {
        Self { defaults: Vec::new(), selectors: Vec::new() }
    }

    /// Starts building a configuration.
    #[inline]
    pub fn builder() -> ConfigBuilder<E> {
        ConfigBuilder::new()
    }

    /// A configuration with the given default handlers and nothing else.
    ///
    /// # Examples
    ///
    /// ```
    /// use scope_rail::{handlers::Discard, Config, DefaultHandler};
    ///
    /// let config = Config::<String>::with_defaults([Box::new(Discard) as DefaultHandler<String>]);
    /// assert_eq!(config.run(|e| e.fail_now(Some("ignored".to_string()))), Ok(()));
    /// ```
    pub fn with_defaults<I>(handlers: I) -> Self
    where
        I: IntoIterator<Item = DefaultHandler<E>>,
    {
        Self { defaults: handlers.into_iter().collect(), selectors: Vec::new() }
    }

    /// The default handler chain, in application order.
    pub fn defaults(&self) -> impl Iterator<Item = &dyn Handler<E>> + '_ {
        self.defaults.iter().map(|h| &**h as &dyn Handler<E>)
    }

    /// Resolves a cleanup for a value of runtime type.
    ///
    /// Built-in closure matchers are tried first, then the configured
    /// selectors in registration order.
    pub fn select_cleanup(&self, value: Box<dyn Any>) -> Option<Cleanup<'static, E>>
    where
        E: 'static,
    {
        let mut value = match builtin_selector(value) {
            Ok(cleanup) => return Some(cleanup),
            Err(value) => value,
        };
        for select in &self.selectors {
            value = match select(value) {
                Ok(cleanup) => return Some(cleanup),
                Err(value) => value,
            };
        }
        None
    }
}

impl<E: FromPanic> Config<E> {
    /// Runs `f` in a new scope under the background context.
    ///
    /// Returns the block's value, or the first error that survived its
    /// handler chain. Every registered cleanup has run by the time this
    /// returns. A panic inside the block or a cleanup is re-raised after
    /// cleanup completes.
    pub fn run<'s, T, F>(&'s self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Scope<'s, E>) -> Flow<T>,
    {
        self.run_with_context(Context::background(), f)
    }

    /// Like [`run`](Config::run), exposing `context` to handlers and cleanups.
    ///
    /// # Examples
    ///
    /// ```
    /// use scope_rail::{Config, Context};
    ///
    /// let ctx = Context::cancellable();
    /// ctx.cancel();
    ///
    /// let result = Config::<String>::new().run_with_context(ctx, |e| {
    ///     let cancelled = e.context().is_cancelled();
    ///     e.assert(!cancelled, "request cancelled")
    /// });
    /// assert_eq!(result, Err("request cancelled".to_string()));
    /// ```
    pub fn run_with_context<'s, T, F>(&'s self, context: Context, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Scope<'s, E>) -> Flow<T>,
    {
        Scope::execute(self, context, f)
    }
}

impl<E> Default for Config<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Config<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("default_handlers", &self.defaults.len())
            .field("cleanup_selectors", &self.selectors.len())
            .finish()
    }
}

/// Builder for [`Config`].
#[must_use]
pub struct ConfigBuilder<E> {
    defaults: Vec<DefaultHandler<E>>,
    selectors: Vec<Selector<E>>,
}

impl<E> ConfigBuilder<E> {
    pub fn new() -> Self {
        Self { defaults: Vec::new(), selectors: Vec::new() }
    }

    /// Appends a handler to the default chain.
    pub fn default_handler<H>(mut self, handler: H) -> Self
    where
        H: Handler<E> + Send + Sync + 'static,
    {
        self.defaults.push(Box::new(handler));
        self
    }

    /// Appends a closure to the default chain.
    pub fn default_fn<F>(self, f: F) -> Self
    where
        F: Fn(&ScopeState<'_, E>, E) -> Option<E> + Send + Sync + 'static,
    {
        self.default_handler(handler_fn(f))
    }

    /// Appends a selector for [`Scope::defer_any`](crate::Scope::defer_any).
    ///
    /// Selectors are tried in registration order, after the built-in ones.
    pub fn cleanup_selector<S>(mut self, selector: S) -> Self
    where
        S: Fn(Box<dyn Any>) -> Result<Cleanup<'static, E>, Box<dyn Any>> + Send + Sync + 'static,
    {
        self.selectors.push(Box::new(selector));
        self
    }

    pub fn build(self) -> Config<E> {
        Config { defaults: self.defaults, selectors: self.selectors }
    }
}

impl<E> Default for ConfigBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}
