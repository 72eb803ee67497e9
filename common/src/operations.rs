//! Abstract storage operations.
//!
//! Each operation is a plain wrapper type, so a storage implements
//! [`Handler`] for the exact operations it supports.

use std::marker::PhantomData;

use crate::Handler;

/// Inserts a new value.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Updates an existing value, inserting it if it is missing.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Deletes a value.
#[derive(Clone, Copy, Debug)]
pub struct Delete<T>(pub T);

/// Selects a value.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Locks a value until the end of the current transaction.
#[derive(Clone, Copy, Debug)]
pub struct Lock<T>(pub T);

/// Starts a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// Storage produced by [`Transact`]ing `T`.
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Commits a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Selector of a `W` by a `B`.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Type of the selected value.
    _what: PhantomData<W>,

    /// Value to select by.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] selecting a `W` by the provided `by` value.
    #[must_use]
    pub fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Returns the value this [`By`] selects by.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}
