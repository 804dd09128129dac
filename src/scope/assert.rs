use std::fmt;

use crate::scope::Scope;
use crate::traits::Handler;
use crate::types::{Flow, FromPanic};

impl<'s, E: FromPanic> Scope<'s, E> {
    /// Aborts the block with `msg` unless `cond` holds.
    ///
    /// The error goes through the default handlers like any other; `msg` is
    /// only converted when the condition fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use scope_rail::Config;
    ///
    /// let result = Config::<String>::new().run(|e| {
    ///     let len = 3;
    ///     e.assert(len >= 4, "record too short")?;
    ///     Ok(len)
    /// });
    /// assert_eq!(result, Err("record too short".to_string()));
    /// ```
    #[inline]
    pub fn assert<M>(&mut self, cond: bool, msg: M) -> Flow
    where
        M: Into<E>,
    {
        self.assert_with(cond, msg, &[])
    }

    /// Like [`assert`](Scope::assert), with explicit handlers.
    pub fn assert_with<M>(&mut self, cond: bool, msg: M, handlers: &[&dyn Handler<E>]) -> Flow
    where
        M: Into<E>,
    {
        if cond {
            return Ok(());
        }
        self.fail(msg.into(), handlers)
    }

    /// Aborts the block with a formatted message unless `cond` holds.
    ///
    /// The message is only rendered when the condition fails. The
    /// [`ensure!`](crate::ensure) macro is the usual way to call this.
    pub fn assert_fmt(&mut self, cond: bool, args: fmt::Arguments<'_>) -> Flow
    where
        E: From<String>,
    {
        if cond {
            return Ok(());
        }
        self.fail(E::from(fmt::format(args)), &[])
    }
}
