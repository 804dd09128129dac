//! The error handler capability and its chain semantics.
//!
//! A handler receives an error together with a read-only view of the scope and
//! decides what happens to it: pass it on, replace it, or discard it by
//! returning `None`. Handlers are applied as a chain; see [`apply_chain`].

use std::sync::Arc;

use crate::scope::ScopeState;

/// Processes an error raised inside a scope.
///
/// Returning `None` discards the error: the remaining handlers of the chain are
/// skipped and the block carries on as if nothing failed. Returning `Some`
/// passes the (possibly replaced) error to the next handler.
///
/// While [`ScopeState::is_panicking`] is true the handler is only consulted:
/// whatever it returns, the fault is recorded and re-raised.
///
/// # Examples
///
/// ```
/// use scope_rail::{Handler, ScopeState};
///
/// struct Prefix(&'static str);
///
/// impl Handler<String> for Prefix {
///     fn handle(&self, _state: &ScopeState<'_, String>, err: String) -> Option<String> {
///         Some(format!("{}: {}", self.0, err))
///     }
/// }
/// ```
pub trait Handler<E> {
    /// Handles `err`, returning the error to keep or `None` to discard it.
    fn handle(&self, state: &ScopeState<'_, E>, err: E) -> Option<E>;
}

impl<E, H> Handler<E> for &H
where
    H: Handler<E> + ?Sized,
{
    #[inline]
    fn handle(&self, state: &ScopeState<'_, E>, err: E) -> Option<E> {
        (**self).handle(state, err)
    }
}

impl<E, H> Handler<E> for Box<H>
where
    H: Handler<E> + ?Sized,
{
    #[inline]
    fn handle(&self, state: &ScopeState<'_, E>, err: E) -> Option<E> {
        (**self).handle(state, err)
    }
}

impl<E, H> Handler<E> for Arc<H>
where
    H: Handler<E> + ?Sized,
{
    #[inline]
    fn handle(&self, state: &ScopeState<'_, E>, err: E) -> Option<E> {
        (**self).handle(state, err)
    }
}

/// An owned handler, as attached to a single cleanup.
pub type BoxHandler<'h, E> = Box<dyn Handler<E> + 'h>;

/// Boxes `handler` for attaching to a cleanup.
///
/// The [`attach!`](crate::attach) macro calls this for every listed handler.
#[inline]
pub fn boxed_handler<'h, E, H>(handler: H) -> BoxHandler<'h, E>
where
    H: Handler<E> + 'h,
{
    Box::new(handler)
}

/// Adapter that turns a closure into a [`Handler`].
///
/// Created by [`handler_fn`].
#[derive(Clone, Copy)]
pub struct HandlerFn<F> {
    f: F,
}

impl<E, F> Handler<E> for HandlerFn<F>
where
    F: Fn(&ScopeState<'_, E>, E) -> Option<E>,
{
    #[inline]
    fn handle(&self, state: &ScopeState<'_, E>, err: E) -> Option<E> {
        (self.f)(state, err)
    }
}

/// Wraps a closure as a [`Handler`].
///
/// # Examples
///
/// ```
/// use scope_rail::{handler_fn, Config};
///
/// let result = Config::<String>::new().run(|e| {
///     let wrap = handler_fn(|_, err: String| Some(format!("wrapped: {err}")));
///     e.fail_now_with(Some("boom".to_string()), &[&wrap])
/// });
///
/// assert_eq!(result, Err("wrapped: boom".to_string()));
/// ```
#[inline]
pub fn handler_fn<E, F>(f: F) -> HandlerFn<F>
where
    F: Fn(&ScopeState<'_, E>, E) -> Option<E>,
{
    HandlerFn { f }
}

/// Threads `err` through `handlers` in order.
///
/// Stops at the first handler that discards the error and returns `None`;
/// otherwise returns whatever the last handler produced. An empty chain hands
/// the error back unchanged.
///
/// # Examples
///
/// ```
/// use scope_rail::{apply_chain, handler_fn, handlers::Discard, Context, Handler, ScopeState};
///
/// let ctx = Context::background();
/// let state = ScopeState::new(&ctx, None, false);
/// let double = handler_fn(|_, err: u32| Some(err * 2));
///
/// let chain: [&dyn Handler<u32>; 2] = [&double, &double];
/// assert_eq!(apply_chain(chain, &state, 3), Some(12));
///
/// let chain: [&dyn Handler<u32>; 2] = [&Discard, &double];
/// assert_eq!(apply_chain(chain, &state, 3), None);
/// ```
pub fn apply_chain<'h, E: 'h, I>(handlers: I, state: &ScopeState<'_, E>, err: E) -> Option<E>
where
    I: IntoIterator<Item = &'h dyn Handler<E>>,
{
    let mut err = err;
    for handler in handlers {
        err = handler.handle(state, err)?;
    }
    Some(err)
}
