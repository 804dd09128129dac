use core::fmt;

use crate::types::Context;

/// Read-only view of a scope, handed to handlers and cleanup functions.
///
/// # Examples
///
/// ```
/// use scope_rail::{attach, handler_fn, Config};
///
/// let saw_pending = handler_fn(|state, err: String| {
///     assert_eq!(state.err().map(String::as_str), Some("first"));
///     assert!(!state.is_panicking());
///     Some(err)
/// });
///
/// let result = Config::<String>::new().run(|e| {
///     e.defer_with(|_| Err("second".to_string()), attach![saw_pending]);
///     e.fail_now(Some("first".to_string()))
/// });
///
/// assert_eq!(result, Err("first".to_string()));
/// ```
pub struct ScopeState<'a, E> {
    context: &'a Context,
    pending: Option<&'a E>,
    panicking: bool,
}

impl<'a, E> ScopeState<'a, E> {
    /// Builds a view from its parts.
    ///
    /// Scopes build their own views; this is public so handlers can be
    /// exercised in isolation.
    #[inline]
    pub fn new(context: &'a Context, pending: Option<&'a E>, panicking: bool) -> Self {
        Self { context, pending, panicking }
    }

    /// The context passed to [`Config::run_with_context`](crate::Config::run_with_context),
    /// or the background context.
    #[inline]
    pub fn context(&self) -> &'a Context {
        self.context
    }

    /// Reports whether the scope is processing an uncontrolled fault.
    ///
    /// The fault is re-raised once error handling completes, and a handler
    /// cannot replace the recorded error while this is true.
    #[inline]
    pub fn is_panicking(&self) -> bool {
        self.panicking
    }

    /// The first error that survived a handler chain, if any.
    ///
    /// This is never the error currently being handled.
    #[inline]
    pub fn err(&self) -> Option<&'a E> {
        self.pending
    }
}

impl<E> Clone for ScopeState<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for ScopeState<'_, E> {}

impl<E: fmt::Debug> fmt::Debug for ScopeState<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeState")
            .field("context", self.context)
            .field("pending", &self.pending)
            .field("panicking", &self.panicking)
            .finish()
    }
}
