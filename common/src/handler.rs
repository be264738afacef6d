//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler.
///
/// A single abstraction behind commands, queries, database operations and
/// background tasks alike: an input, an output, and an error.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
