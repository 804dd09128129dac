//! Cleanup registry and the `defer*` registration methods.
//!
//! Cleanups are kept on a stack. Handlers attached to a cleanup are pushed as
//! marker entries right before it, in reverse, so that popping the cleanup
//! leaves its handlers on top of the stack in the order they were listed.

use core::any::{type_name, Any};

use smallvec::SmallVec;

use crate::scope::{Scope, ScopeState};
use crate::traits::{BoxHandler, Close, Unlock};

/// Number of stack entries stored inline before the registry spills to the heap.
pub const INLINE_CLEANUPS: usize = 3;

/// A registered cleanup: owns its target and knows how to release it.
///
/// It receives the scope's state view, so it can inspect the pending error.
pub type Cleanup<'s, E> = Box<dyn FnOnce(&ScopeState<'_, E>) -> Result<(), E> + 's>;

/// Boxes a closure as a [`Cleanup`].
///
/// Mostly useful to custom cleanup selectors (see
/// [`ConfigBuilder::cleanup_selector`](crate::ConfigBuilder::cleanup_selector)).
#[inline]
pub fn into_cleanup<'s, E, F>(f: F) -> Cleanup<'s, E>
where
    F: FnOnce(&ScopeState<'_, E>) -> Result<(), E> + 's,
{
    Box::new(f)
}

/// Cleanup strategy for a [`Close`] resource.
///
/// Prefers `close_with_error` whenever an error is pending.
pub(crate) fn closing<'s, E, C>(resource: C) -> Cleanup<'s, E>
where
    C: Close<E> + 's,
{
    into_cleanup(move |state: &ScopeState<'_, E>| match state.err() {
        Some(cause) => resource.close_with_error(cause),
        None => resource.close(),
    })
}

/// Cleanup strategy for an [`Unlock`] guard.
pub(crate) fn unlocking<'s, E, G>(guard: G) -> Cleanup<'s, E>
where
    G: Unlock + 's,
{
    into_cleanup(move |_: &ScopeState<'_, E>| {
        guard.unlock();
        Ok(())
    })
}

/// Matches the boxed callables `defer_any` understands without any selector.
pub(crate) fn builtin_selector<E: 'static>(
    value: Box<dyn Any>,
) -> Result<Cleanup<'static, E>, Box<dyn Any>> {
    let value = match value.downcast::<Cleanup<'static, E>>() {
        Ok(cleanup) => return Ok(*cleanup),
        Err(value) => value,
    };
    let value = match value.downcast::<Box<dyn FnOnce() -> Result<(), E>>>() {
        Ok(f) => return Ok(into_cleanup(move |_: &ScopeState<'_, E>| f())),
        Err(value) => value,
    };
    let value = match value.downcast::<Box<dyn FnOnce(Option<&E>)>>() {
        Ok(f) => {
            return Ok(into_cleanup(move |state: &ScopeState<'_, E>| {
                f(state.err());
                Ok(())
            }))
        },
        Err(value) => value,
    };
    match value.downcast::<Box<dyn FnOnce()>>() {
        Ok(f) => Ok(into_cleanup(move |_: &ScopeState<'_, E>| {
            f();
            Ok(())
        })),
        Err(value) => Err(value),
    }
}

pub(crate) enum Entry<'s, E> {
    /// Handler applied to errors of the cleanup registered right after it.
    Handler(BoxHandler<'s, E>),
    Cleanup(Cleanup<'s, E>),
}

pub(crate) type HandlerVec<'s, E> = SmallVec<[BoxHandler<'s, E>; 2]>;

/// LIFO stack of pending cleanups and their handler markers.
pub(crate) struct CleanupStack<'s, E> {
    entries: SmallVec<[Entry<'s, E>; INLINE_CLEANUPS]>,
}

impl<'s, E> CleanupStack<'s, E> {
    #[inline]
    pub(crate) fn new() -> Self {
        Self { entries: SmallVec::new() }
    }

    pub(crate) fn push<H>(&mut self, cleanup: Cleanup<'s, E>, handlers: H)
    where
        H: IntoIterator<Item = BoxHandler<'s, E>>,
    {
        let handlers: HandlerVec<'s, E> = handlers.into_iter().collect();
        self.entries.extend(handlers.into_iter().rev().map(Entry::Handler));
        self.entries.push(Entry::Cleanup(cleanup));
    }

    /// Pops the newest cleanup together with the handlers attached to it.
    pub(crate) fn pop(&mut self) -> Option<(Cleanup<'s, E>, HandlerVec<'s, E>)> {
        let cleanup = loop {
            match self.entries.pop()? {
                Entry::Cleanup(cleanup) => break cleanup,
                Entry::Handler(_) => continue,
            }
        };
        let mut handlers = HandlerVec::new();
        while matches!(self.entries.last(), Some(Entry::Handler(_))) {
            if let Some(Entry::Handler(handler)) = self.entries.pop() {
                handlers.push(handler);
            }
        }
        Some((cleanup, handlers))
    }

    /// Number of registered cleanups, not counting handler markers.
    pub(crate) fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, Entry::Cleanup(_)))
            .count()
    }
}

impl<'s, E> Scope<'s, E> {
    /// Registers `f(state, target)` to run when the block exits.
    ///
    /// This is the primitive every other `defer*` method builds on. Errors
    /// returned by `f` go through `handlers`, or through the configured
    /// defaults when `handlers` is empty; the first listed handler runs first.
    /// The handlers are owned by the entry, so they may be built right at the
    /// call site with [`attach!`](crate::attach).
    ///
    /// # Examples
    ///
    /// ```
    /// use scope_rail::{attach, handlers::Discard, Config};
    ///
    /// let result = Config::<String>::new().run(|e| {
    ///     e.defer_func(
    ///         "/tmp/lock",
    ///         |_, path| Err(format!("removing {path}")),
    ///         attach![Discard],
    ///     );
    ///     Ok(())
    /// });
    /// assert_eq!(result, Ok(()));
    /// ```
    pub fn defer_func<T, F, H>(&mut self, target: T, f: F, handlers: H)
    where
        T: 's,
        H: IntoIterator<Item = BoxHandler<'s, E>>,
        F: FnOnce(&ScopeState<'_, E>, T) -> Result<(), E> + 's,
    {
        let cleanup = into_cleanup(move |state: &ScopeState<'_, E>| f(state, target));
        self.cleanups.push(cleanup, handlers);
    }

    /// Registers a cleanup closure that receives the state view.
    #[inline]
    pub fn defer<F>(&mut self, f: F)
    where
        F: FnOnce(&ScopeState<'_, E>) -> Result<(), E> + 's,
    {
        self.defer_with(f, []);
    }

    /// Like [`defer`](Scope::defer), with handlers for the cleanup's error.
    pub fn defer_with<F, H>(&mut self, f: F, handlers: H)
    where
        F: FnOnce(&ScopeState<'_, E>) -> Result<(), E> + 's,
        H: IntoIterator<Item = BoxHandler<'s, E>>,
    {
        self.cleanups.push(into_cleanup(f), handlers);
    }

    /// Registers a procedure that cannot fail.
    pub fn defer_call<F>(&mut self, f: F)
    where
        F: FnOnce() + 's,
    {
        let cleanup = into_cleanup(move |_: &ScopeState<'_, E>| {
            f();
            Ok(())
        });
        self.cleanups.push(cleanup, []);
    }

    /// Registers `resource` to be closed at block exit.
    ///
    /// When the block has failed by then, [`Close::close_with_error`] receives
    /// the pending error; otherwise [`Close::close`] is used.
    #[inline]
    pub fn defer_close<C>(&mut self, resource: C)
    where
        C: Close<E> + 's,
    {
        self.defer_close_with(resource, []);
    }

    /// Like [`defer_close`](Scope::defer_close), with handlers for the close error.
    pub fn defer_close_with<C, H>(&mut self, resource: C, handlers: H)
    where
        C: Close<E> + 's,
        H: IntoIterator<Item = BoxHandler<'s, E>>,
    {
        self.cleanups.push(closing(resource), handlers);
    }

    /// Registers a held lock to be released at block exit.
    pub fn defer_unlock<G>(&mut self, guard: G)
    where
        G: Unlock + 's,
    {
        self.cleanups.push(unlocking(guard), []);
    }

    /// Registers a value whose cleanup strategy is picked at runtime.
    ///
    /// The boxed callables `Box<dyn FnOnce()>`, `Box<dyn FnOnce() -> Result<(), E>>`,
    /// `Box<dyn FnOnce(Option<&E>)>` and [`Cleanup<'static, E>`] are recognised
    /// directly; any other type is offered to the selectors registered on the
    /// [`Config`](crate::Config), in order, and the first match wins.
    ///
    /// # Panics
    ///
    /// Panics when no strategy matches: registering an unsupported type is a
    /// programming error.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    /// use scope_rail::Config;
    ///
    /// let closed = Rc::new(Cell::new(false));
    /// let flag = Rc::clone(&closed);
    ///
    /// let result = Config::<String>::new().run(|e| {
    ///     let release: Box<dyn FnOnce()> = Box::new(move || flag.set(true));
    ///     e.defer_any(release, []);
    ///     Ok(())
    /// });
    ///
    /// assert_eq!(result, Ok(()));
    /// assert!(closed.get());
    /// ```
    pub fn defer_any<T, H>(&mut self, value: T, handlers: H)
    where
        T: Any,
        H: IntoIterator<Item = BoxHandler<'s, E>>,
        E: 'static,
    {
        match self.config.select_cleanup(Box::new(value)) {
            Some(cleanup) => self.cleanups.push(cleanup, handlers),
            None => panic!("scope-rail: type {} not supported by defer_any", type_name::<T>()),
        }
    }
}
