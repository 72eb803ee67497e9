//! [`Handler`] abstraction.
//!
//! Commands, queries and database operations are all modeled as a [`Handler`]
//! of some argument type, so a single type (e.g. the service) can implement
//! many of them and generic code can require exactly the ones it needs.

use std::future::Future;

/// Something executable with `Args`.
pub trait Handler<Args = ()> {
    /// Successful outcome of the execution.
    type Ok;

    /// Failed outcome of the execution.
    type Err;

    /// Executes this [`Handler`] with the provided `args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
