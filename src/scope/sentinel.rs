//! Sentinel comparison.
//!
//! A sentinel is an error value that signals an expected condition rather than
//! a failure, such as end of input. These checks answer "is this the sentinel?"
//! and abort the block for anything else.

use std::io;

use crate::scope::Scope;
use crate::traits::Handler;
use crate::types::{Flow, FromPanic};

impl<'s, E: FromPanic> Scope<'s, E> {
    /// Reports whether `err` is `sentinel`, aborting the block for any other
    /// error that survives the default handlers.
    ///
    /// `None` yields `false`. A handler that discards the error also yields
    /// `false`; a handler that converts it into the sentinel yields `true`
    /// without recording anything.
    ///
    /// # Examples
    ///
    /// ```
    /// use scope_rail::Config;
    ///
    /// let eof = "eof".to_string();
    /// let reads = [None, Some("eof".to_string())];
    ///
    /// let result = Config::<String>::new().run(|e| {
    ///     let mut records = 0;
    ///     for read in reads {
    ///         if e.is_sentinel(&eof, read)? {
    ///             break;
    ///         }
    ///         records += 1;
    ///     }
    ///     Ok(records)
    /// });
    ///
    /// assert_eq!(result, Ok(1));
    /// ```
    #[inline]
    pub fn is_sentinel(&mut self, sentinel: &E, err: Option<E>) -> Flow<bool>
    where
        E: PartialEq,
    {
        self.is_sentinel_with(sentinel, err, &[])
    }

    /// Like [`is_sentinel`](Scope::is_sentinel), with explicit handlers.
    pub fn is_sentinel_with(
        &mut self,
        sentinel: &E,
        err: Option<E>,
        handlers: &[&dyn Handler<E>],
    ) -> Flow<bool>
    where
        E: PartialEq,
    {
        self.is_sentinel_by(|err| err == sentinel, err, handlers)
    }

    /// Sentinel check for error types that identify the sentinel by
    /// inspection instead of equality.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io;
    /// use scope_rail::Config;
    ///
    /// let result = Config::<io::Error>::new().run(|e| {
    ///     let eof = io::Error::from(io::ErrorKind::UnexpectedEof);
    ///     e.is_sentinel_by(|err| err.kind() == io::ErrorKind::UnexpectedEof, Some(eof), &[])
    /// });
    ///
    /// assert!(matches!(result, Ok(true)));
    /// ```
    pub fn is_sentinel_by<P>(
        &mut self,
        is_sentinel: P,
        err: Option<E>,
        handlers: &[&dyn Handler<E>],
    ) -> Flow<bool>
    where
        P: Fn(&E) -> bool,
    {
        let err = match err {
            None => return Ok(false),
            Some(err) if is_sentinel(&err) => return Ok(true),
            Some(err) => err,
        };
        match self.handle(err, handlers) {
            None => Ok(false),
            Some(err) if is_sentinel(&err) => Ok(true),
            Some(err) => {
                self.record(err);
                Err(self.raise())
            },
        }
    }
}

impl<'s> Scope<'s, io::Error> {
    /// Reports whether `err` is an end-of-input error
    /// ([`io::ErrorKind::UnexpectedEof`]), aborting the block for any other
    /// error that survives the default handlers.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::{self, Read};
    /// use scope_rail::Config;
    ///
    /// let mut input: &[u8] = b"ab";
    /// let result = Config::<io::Error>::new().run(|e| {
    ///     let mut byte = [0; 1];
    ///     let mut count = 0;
    ///     while !e.is_eof(input.read_exact(&mut byte).err())? {
    ///         count += 1;
    ///     }
    ///     Ok(count)
    /// });
    ///
    /// assert_eq!(result.unwrap(), 2);
    /// ```
    #[inline]
    pub fn is_eof(&mut self, err: Option<io::Error>) -> Flow<bool> {
        self.is_sentinel_by(|err| err.kind() == io::ErrorKind::UnexpectedEof, err, &[])
    }
}
