//! [`Command`] for deleting an [`Amenity`].

use common::operations::{By, Commit, Delete, Lock, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{amenity, Amenity},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for deleting an [`Amenity`].
///
/// The deletion is refused while open (NEW or APPROVED) [`Booking`]s still
/// reference the [`Amenity`]: those have to be settled by an administrator
/// first.
///
/// [`Booking`]: crate::domain::Booking
#[derive(Clone, Copy, Debug)]
pub struct DeleteAmenity {
    /// ID of the [`Amenity`] to delete.
    pub amenity_id: amenity::Id,
}

impl<Db> Command<DeleteAmenity> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Amenity>, amenity::Id>>,
            Ok = Option<Amenity>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Amenity, amenity::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::booking::HasOpen, amenity::Id>>,
            Ok = read::booking::HasOpen,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Amenity, amenity::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteAmenity) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteAmenity { amenity_id } = cmd;

        self.database()
            .execute(Select(By::<Option<Amenity>, _>::new(amenity_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AmenityNotExists(amenity_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Keeps a concurrent `CreateBooking` from racing the deletion.
        tx.execute(Lock(By::new(amenity_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let read::booking::HasOpen(has_open) = tx
            .execute(Select(By::new(amenity_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if has_open {
            return Err(tracerr::new!(E::OpenBookingsExist(amenity_id)));
        }

        tx.execute(Delete(By::new(amenity_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(())
    }
}

/// Error of [`DeleteAmenity`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Amenity`] with the provided ID does not exist.
    #[display("`Amenity(id: {_0})` does not exist")]
    AmenityNotExists(#[error(not(source))] amenity::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Open [`Booking`]s still reference the [`Amenity`].
    ///
    /// [`Booking`]: crate::domain::Booking
    #[display("`Amenity(id: {_0})` still has open bookings")]
    OpenBookingsExist(#[error(not(source))] amenity::Id),
}
