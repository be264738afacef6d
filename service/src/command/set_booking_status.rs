//! [`Command`] for deciding on a [`Booking`].

use common::operations::{By, Commit, Lock, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking, Booking},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for transitioning a [`Booking`] into a new [`Status`].
///
/// The status change is the sole authorization signal the resident sees.
///
/// [`Status`]: booking::Status
#[derive(Clone, Copy, Debug)]
pub struct SetBookingStatus {
    /// ID of the [`Booking`] to decide on.
    pub booking_id: booking::Id,

    /// [`Status`] to transition into.
    ///
    /// [`Status`]: booking::Status
    pub status: booking::Status,
}

impl<Db> Command<SetBookingStatus> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Booking, booking::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SetBookingStatus,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SetBookingStatus { booking_id, status } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serializes concurrent decisions upon the same `Booking`.
        tx.execute(Lock(By::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        if !booking.status.can_transition_to(status) {
            return Err(tracerr::new!(E::InvalidTransition {
                from: booking.status,
                to: status,
            }));
        }

        booking.status = status;
        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(booking)
    }
}

/// Error of [`SetBookingStatus`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Requested transition violates the [`Booking`] status workflow.
    #[display("`Booking` status cannot go from {from} to {to}")]
    InvalidTransition {
        /// Current [`Status`] of the [`Booking`].
        ///
        /// [`Status`]: booking::Status
        from: booking::Status,

        /// Requested [`Status`].
        ///
        /// [`Status`]: booking::Status
        to: booking::Status,
    },
}
