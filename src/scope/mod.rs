//! The execution-scope engine.
//!
//! A [`Scope`] is created for every block execution. It owns the cleanup
//! stack and the first recorded error, routes every error site through the
//! handler chain, and turns the three ways a block can end (falling through,
//! aborting, panicking) into one exit path:
//!
//! ```text
//! Running --fail_now(err survives)--> Draining --> Done (Err(err))
//! Running --block returns Ok-------> Draining --> Done (Ok(value) or first cleanup error)
//! Running --panic------------------> Draining --> Done (panic resumed)
//! ```
//!
//! Cleanups always drain newest first, and a panic inside a cleanup does not
//! stop the entries below it from running.

use core::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::config::Config;
use crate::macros::trace_event;
use crate::traits::{apply_chain, BoxHandler, Handler};
use crate::types::{Abort, Context, Flow, FromPanic};

mod assert;
pub mod cleanup;
mod sentinel;
pub mod state;

pub use cleanup::{into_cleanup, Cleanup};
pub use state::ScopeState;

use cleanup::CleanupStack;

/// Panic message used when a block returns an [`Abort`] its scope never raised.
const FOREIGN_ABORT: &str = "scope-rail: abort signal escaped the scope that raised it";

/// Where a scope is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The block is executing.
    Running,
    /// Cleanups are being invoked.
    Draining,
    /// The outcome of the block is decided.
    Done,
}

/// Coordinates error checks and cleanups for one block execution.
///
/// A `Scope` is handed to the block by [`Config::run`] and friends. Inside
/// the block, fallible steps are checked with [`fail_now`](Scope::fail_now),
/// [`must`](Scope::must), [`check`](Scope::check) or the assertion and
/// sentinel helpers, and cleanups are registered with the `defer*` family.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use scope_rail::Config;
///
/// let log = RefCell::new(Vec::new());
/// let config = Config::<String>::new();
///
/// let result = config.run(|e| {
///     e.defer_call(|| log.borrow_mut().push("close a"));
///     e.defer_call(|| log.borrow_mut().push("close b"));
///     e.must(Err::<(), _>("write failed"))?;
///     e.defer_call(|| log.borrow_mut().push("never registered"));
///     Ok(())
/// });
///
/// assert_eq!(result, Err("write failed".to_string()));
/// assert_eq!(*log.borrow(), ["close b", "close a"]);
/// ```
pub struct Scope<'s, E> {
    config: &'s Config<E>,
    context: Context,
    pending: Option<E>,
    aborting: bool,
    panicking: bool,
    phase: Phase,
    cleanups: CleanupStack<'s, E>,
    fault: Option<Box<dyn Any + Send>>,
}

impl<'s, E> Scope<'s, E> {
    fn new(config: &'s Config<E>, context: Context) -> Self {
        Self {
            config,
            context,
            pending: None,
            aborting: false,
            panicking: false,
            phase: Phase::Running,
            cleanups: CleanupStack::new(),
            fault: None,
        }
    }

    /// The context this block runs under.
    #[inline]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The first error that survived its handler chain, if any.
    #[inline]
    pub fn err(&self) -> Option<&E> {
        self.pending.as_ref()
    }

    /// Current lifecycle phase.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of cleanups registered and not yet invoked.
    #[inline]
    pub fn pending_cleanups(&self) -> usize {
        self.cleanups.len()
    }

    /// Read-only view passed to handlers.
    #[inline]
    pub fn state(&self) -> ScopeState<'_, E> {
        ScopeState::new(&self.context, self.pending.as_ref(), self.panicking)
    }

    /// Runs `err` through `handlers`, or through the configured defaults when
    /// no handlers were given at the error site.
    fn handle(&self, err: E, handlers: &[&dyn Handler<E>]) -> Option<E> {
        let state = self.state();
        if handlers.is_empty() {
            apply_chain(self.config.defaults(), &state, err)
        } else {
            apply_chain(handlers.iter().copied(), &state, err)
        }
    }

    /// Keeps `err` unless an earlier error is already recorded.
    fn record(&mut self, err: E) {
        if self.pending.is_none() {
            self.pending = Some(err);
        }
    }
}

impl<'s, E: FromPanic> Scope<'s, E> {
    /// Aborts the block if `err` is an error that survives handling.
    ///
    /// `None` is a no-op. Otherwise the error goes through the configured
    /// default handlers; if it is still present afterwards it is recorded
    /// (unless an earlier error already was), all pending cleanups run, and
    /// `Err(Abort)` is returned for the block to propagate with `?`.
    ///
    /// # Examples
    ///
    /// ```
    /// use scope_rail::Config;
    ///
    /// let result = Config::<String>::new().run(|e| {
    ///     e.fail_now(None)?;
    ///     e.fail_now(Some("bad header".to_string()))?;
    ///     Ok(())
    /// });
    /// assert_eq!(result, Err("bad header".to_string()));
    /// ```
    #[inline]
    pub fn fail_now(&mut self, err: Option<E>) -> Flow {
        self.fail_now_with(err, &[])
    }

    /// Like [`fail_now`](Scope::fail_now), with explicit handlers.
    ///
    /// Explicit handlers replace the configured defaults for this error site.
    pub fn fail_now_with(&mut self, err: Option<E>, handlers: &[&dyn Handler<E>]) -> Flow {
        match err {
            None => Ok(()),
            Some(err) => self.fail(err, handlers),
        }
    }

    /// Unwraps `result`, aborting the block on an error that survives handling.
    ///
    /// When a default handler discards the error, `T::default()` is returned
    /// and the block carries on. Use [`check`](Scope::check) for values without
    /// a meaningful default.
    #[inline]
    pub fn must<T, X>(&mut self, result: Result<T, X>) -> Flow<T>
    where
        T: Default,
        X: Into<E>,
    {
        self.must_with(result, &[])
    }

    /// Like [`must`](Scope::must), with explicit handlers.
    ///
    /// # Examples
    ///
    /// ```
    /// use scope_rail::{handlers::Discard, Config};
    ///
    /// let result = Config::<String>::new().run(|e| {
    ///     let n: usize = e.must_with(Err::<usize, _>("short read"), &[&Discard])?;
    ///     Ok(n)
    /// });
    /// assert_eq!(result, Ok(0));
    /// ```
    pub fn must_with<T, X>(&mut self, result: Result<T, X>, handlers: &[&dyn Handler<E>]) -> Flow<T>
    where
        T: Default,
        X: Into<E>,
    {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                self.fail(err.into(), handlers)?;
                Ok(T::default())
            },
        }
    }

    /// Unwraps `result` into `Some`, aborting the block on an error that
    /// survives handling; `None` means a handler discarded the error.
    #[inline]
    pub fn check<T, X>(&mut self, result: Result<T, X>) -> Flow<Option<T>>
    where
        X: Into<E>,
    {
        self.check_with(result, &[])
    }

    /// Like [`check`](Scope::check), with explicit handlers.
    pub fn check_with<T, X>(
        &mut self,
        result: Result<T, X>,
        handlers: &[&dyn Handler<E>],
    ) -> Flow<Option<T>>
    where
        X: Into<E>,
    {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) => self.fail(err.into(), handlers).map(|()| None),
        }
    }

    fn fail(&mut self, err: E, handlers: &[&dyn Handler<E>]) -> Flow {
        match self.handle(err, handlers) {
            None => Ok(()),
            Some(err) => {
                self.record(err);
                Err(self.raise())
            },
        }
    }

    /// Drains the cleanups and produces the abort signal.
    fn raise(&mut self) -> Abort {
        trace_event!(debug, pending_cleanups = self.cleanups.len(), "scope aborted");
        self.drain();
        self.aborting = true;
        Abort::new()
    }

    /// Invokes every pending cleanup, newest first.
    fn drain(&mut self) {
        self.phase = Phase::Draining;
        while let Some((cleanup, handlers)) = self.cleanups.pop() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                let result = cleanup(&self.state());
                if let Err(err) = result {
                    self.cleanup_failed(err, &handlers);
                }
            }));
            if let Err(payload) = outcome {
                self.record_fault(payload);
            }
        }
    }

    fn cleanup_failed(&mut self, err: E, handlers: &[BoxHandler<'s, E>]) {
        trace_event!(debug, attached_handlers = handlers.len(), "cleanup failed");
        let state = self.state();
        let handled = if handlers.is_empty() {
            apply_chain(self.config.defaults(), &state, err)
        } else {
            apply_chain(handlers.iter().map(|h| &**h as &dyn Handler<E>), &state, err)
        };
        if let Some(err) = handled {
            self.record(err);
        }
    }

    /// Records a panic caught in the block or in a cleanup.
    ///
    /// The first fault becomes the pending error and is re-raised once
    /// draining completes; later faults are only reported to the default
    /// handlers.
    fn record_fault(&mut self, payload: Box<dyn Any + Send>) {
        let first = self.fault.is_none();
        self.panicking = true;
        if first {
            self.pending = Some(E::from_panic(&*payload));
        }
        trace_event!(warn, first_fault = first, "captured panic in scope");
        self.observe_fault(&*payload);
        if first {
            self.fault = Some(payload);
        }
    }

    /// Shows a fault to the default handlers. Their verdict is ignored.
    ///
    /// A handler that panics here cannot replace the fault being observed, so
    /// its payload is reported and dropped.
    fn observe_fault(&self, payload: &(dyn Any + Send)) {
        let observed = E::from_panic(payload);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let state = self.state();
            apply_chain(self.config.defaults(), &state, observed)
        }));
        if let Err(_nested) = outcome {
            trace_event!(
                warn,
                nested_panic = %crate::types::Panicked::from_payload(&*_nested),
                "default handler panicked while observing a fault"
            );
        }
    }

    fn intercept(&mut self, abort: Abort) {
        drop(abort);
        if !self.aborting {
            self.record_fault(Box::new(FOREIGN_ABORT));
        }
    }

    fn finish<T>(mut self, value: Option<T>) -> Result<T, E> {
        self.phase = Phase::Done;
        if let Some(payload) = self.fault.take() {
            trace_event!(warn, "resuming panic after cleanup");
            panic::resume_unwind(payload);
        }
        match (self.pending.take(), value) {
            (Some(err), _) => Err(err),
            (None, Some(value)) => Ok(value),
            (None, None) => panic!("scope-rail: block aborted without recording an error"),
        }
    }

    /// Runs `f` as one block execution.
    pub(crate) fn execute<T, F>(config: &'s Config<E>, context: Context, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Scope<'s, E>) -> Flow<T>,
    {
        let mut scope = Scope::new(config, context);
        let value = match panic::catch_unwind(AssertUnwindSafe(|| f(&mut scope))) {
            Ok(Ok(value)) => Some(value),
            Ok(Err(abort)) => {
                scope.intercept(abort);
                None
            },
            Err(payload) => {
                scope.record_fault(payload);
                None
            },
        };
        scope.drain();
        scope.finish(value)
    }
}
