//! [`Command`] for deleting a [`Booking`].

use common::operations::{By, Delete, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking, Booking},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for hard-deleting a [`Booking`].
///
/// Administrative cleanup only: the deletion is unconditional, regardless of
/// the [`Booking`] status.
#[derive(Clone, Copy, Debug)]
pub struct DeleteBooking {
    /// ID of the [`Booking`] to delete.
    pub booking_id: booking::Id,
}

impl<Db> Command<DeleteBooking> for Service<Db>
where
    Db: Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Booking, booking::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteBooking { booking_id } = cmd;

        self.database()
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        self.database()
            .execute(Delete(By::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`DeleteBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
