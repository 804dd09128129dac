use core::fmt;

/// Control signal that unwinds a block back to the scope that owns it.
///
/// An `Abort` is produced only by the checking methods of a
/// [`Scope`](crate::Scope) once an error has survived its handler chain.
/// It carries no error of its own (the error is already recorded in the
/// scope), so the only sensible thing to do with it is to hand it back with
/// `?` until the block returns.
///
/// `Abort` does not implement [`std::error::Error`], so it cannot be mistaken
/// for, or converted into, an ordinary error value.
///
/// # Examples
///
/// ```
/// use scope_rail::{Config, Flow, Scope};
///
/// fn step(e: &mut Scope<'_, String>, ok: bool) -> Flow {
///     e.assert(ok, "step failed")
/// }
///
/// let config = Config::<String>::new();
/// let err = config.run(|e| {
///     step(e, true)?;
///     step(e, false)?;
///     Ok(())
/// });
///
/// assert_eq!(err, Err("step failed".to_string()));
/// ```
#[must_use = "an Abort must be returned from the block so the owning scope can intercept it"]
#[derive(Debug, PartialEq, Eq)]
pub struct Abort {
    _private: (),
}

impl Abort {
    #[inline]
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }
}

impl fmt::Display for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("scope aborted")
    }
}

/// Result type threaded through a block.
///
/// Every checking method on [`Scope`](crate::Scope) returns a `Flow`, and the
/// block itself returns one; `?` carries an [`Abort`] back to the scope
/// boundary.
pub type Flow<T = ()> = Result<T, Abort>;
