//! Cleanup capabilities understood by the typed registration methods.
//!
//! - [`Close`]: a resource that is closed at block exit. Its
//!   [`close_with_error`](Close::close_with_error) variant is picked
//!   automatically whenever the block already failed, so resources that can
//!   propagate an abort reason (pipes, atomic writers) receive it.
//! - [`Unlock`]: a held lock released at block exit.

use std::io::{BufWriter, Write};
use std::sync::{MutexGuard, RwLockReadGuard, RwLockWriteGuard};

/// A resource that needs an explicit, fallible close.
///
/// # Examples
///
/// ```
/// use scope_rail::Close;
///
/// struct Upload;
///
/// impl Close<String> for Upload {
///     fn close(self) -> Result<(), String> {
///         Ok(())
///     }
///
///     fn close_with_error(self, cause: &String) -> Result<(), String> {
///         Err(format!("upload aborted: {cause}"))
///     }
/// }
/// ```
pub trait Close<E>: Sized {
    /// Closes the resource after a successful block.
    fn close(self) -> Result<(), E>;

    /// Closes the resource after the block already failed with `cause`.
    ///
    /// Defaults to [`Close::close`].
    fn close_with_error(self, cause: &E) -> Result<(), E> {
        let _ = cause;
        self.close()
    }
}

/// Flushes the buffer; a flush failure surfaces as the cleanup error.
impl<W, E> Close<E> for BufWriter<W>
where
    W: Write,
    E: From<std::io::Error>,
{
    fn close(self) -> Result<(), E> {
        self.into_inner()
            .map(drop)
            .map_err(|err| E::from(err.into_error()))
    }
}

/// A held lock that is released at block exit.
pub trait Unlock {
    /// Releases the lock.
    fn unlock(self);
}

impl<T: ?Sized> Unlock for MutexGuard<'_, T> {
    #[inline]
    fn unlock(self) {
        drop(self);
    }
}

impl<T: ?Sized> Unlock for RwLockReadGuard<'_, T> {
    #[inline]
    fn unlock(self) {
        drop(self);
    }
}

impl<T: ?Sized> Unlock for RwLockWriteGuard<'_, T> {
    #[inline]
    fn unlock(self) {
        drop(self);
    }
}
