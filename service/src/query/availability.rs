//! [`Query`] for the remaining capacity of an [`Amenity`].

use common::{
    operations::{By, Select},
    Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{amenity, Amenity, Booking},
    infra::{database, Database},
    read::{self, amenity::availability},
    Service,
};

use super::Query;

/// [`Query`] for the remaining capacity of an [`Amenity`] on one [`Date`],
/// per discrete hourly window.
///
/// The single source of truth both clients render their booking calendars
/// from, instead of re-deriving conflicts from raw booking lists.
#[derive(Clone, Copy, Debug)]
pub struct Availability {
    /// ID of the [`Amenity`] to inspect.
    pub amenity_id: amenity::Id,

    /// [`Date`] to inspect.
    pub date: Date,
}

impl<Db> Query<Availability> for Service<Db>
where
    Db: Database<
            Select<By<Option<Amenity>, amenity::Id>>,
            Ok = Option<Amenity>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Booking>, read::booking::OnDate>>,
            Ok = Vec<Booking>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<availability::Window>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: Availability) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Availability { amenity_id, date } = query;

        let amenity = self
            .database()
            .execute(Select(By::<Option<Amenity>, _>::new(amenity_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AmenityNotExists(amenity_id))
            .map_err(tracerr::wrap!())?;

        let booked = self
            .database()
            .execute(Select(By::new(read::booking::OnDate {
                amenity_id: amenity.id,
                usage_date: date,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .into_iter()
            .filter(|b| b.status.is_open())
            .map(|b| b.slot)
            .collect::<Vec<_>>();

        Ok(availability::windows(amenity.hours, amenity.capacity, &booked))
    }
}

/// Error of [`Availability`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Amenity`] with the provided ID does not exist.
    #[display("`Amenity(id: {_0})` does not exist")]
    AmenityNotExists(#[error(not(source))] amenity::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
