use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Ambient cancellation handle carried through a block.
///
/// The scope itself never acts on a `Context`; it is passed read-only to
/// handlers and cleanup functions through [`ScopeState`](crate::ScopeState)
/// so they can, for example, skip decorating an error caused by an
/// intentional cancellation. Clones share the same cancellation flag.
///
/// [`Context::background`] (also the `Default`) carries nothing and does not
/// allocate.
///
/// # Examples
///
/// ```
/// use scope_rail::Context;
///
/// let ctx = Context::cancellable();
/// let observer = ctx.clone();
///
/// assert!(!observer.is_cancelled());
/// ctx.cancel();
/// assert!(observer.is_cancelled());
/// assert!(observer.is_done());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    inner: Option<Arc<ContextInner>>,
}

#[derive(Debug)]
struct ContextInner {
    cancelled: AtomicBool,
    deadline: Option<Instant>,
}

impl Context {
    /// Returns the empty context: never cancelled, no deadline.
    #[inline]
    pub const fn background() -> Self {
        Self { inner: None }
    }

    /// Returns a context that can be cancelled with [`Context::cancel`].
    pub fn cancellable() -> Self {
        Self::build(None)
    }

    /// Returns a cancellable context that also reports a deadline.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::build(Some(deadline))
    }

    fn build(deadline: Option<Instant>) -> Self {
        Self { inner: Some(Arc::new(ContextInner { cancelled: AtomicBool::new(false), deadline })) }
    }

    /// Requests cancellation. A no-op for the background context.
    pub fn cancel(&self) {
        if let Some(inner) = &self.inner {
            inner.cancelled.store(true, Ordering::Release);
        }
    }

    /// Reports whether [`Context::cancel`] was called on this context or a clone.
    pub fn is_cancelled(&self) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|inner| inner.cancelled.load(Ordering::Acquire))
    }

    /// Returns the deadline, if any.
    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.as_ref().and_then(|inner| inner.deadline)
    }

    /// Reports whether the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.deadline().is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Cancelled or expired.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.is_expired()
    }

    /// Reports whether this is the background context.
    #[inline]
    pub fn is_background(&self) -> bool {
        self.inner.is_none()
    }
}
