//! [`Command`] for updating an [`Amenity`].

use common::{
    operations::{By, Select, Update},
    timeslot::InvalidTimeSlot,
    Money, TimeOfDay, TimeSlot,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{amenity, Amenity},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating an existing [`Amenity`].
#[derive(Clone, Debug)]
pub struct UpdateAmenity {
    /// ID of the [`Amenity`] to update.
    pub amenity_id: amenity::Id,

    /// New [`Name`] of the [`Amenity`].
    ///
    /// [`Name`]: amenity::Name
    pub name: amenity::Name,

    /// New [`Location`] of the [`Amenity`].
    ///
    /// [`Location`]: amenity::Location
    pub location: amenity::Location,

    /// New [`Description`] of the [`Amenity`], if any.
    ///
    /// [`Description`]: amenity::Description
    pub description: Option<amenity::Description>,

    /// New opening time of the [`Amenity`].
    pub opening: TimeOfDay,

    /// New closing time of the [`Amenity`].
    pub closing: TimeOfDay,

    /// New maximum number of bookings per overlapping window.
    pub capacity: u16,

    /// New usage fee, if the [`Amenity`] charges one.
    pub fee: Option<Money>,

    /// New reference to an image, if any.
    pub image: Option<amenity::ImageRef>,
}

impl<Db> Command<UpdateAmenity> for Service<Db>
where
    Db: Database<
            Select<By<Option<Amenity>, amenity::Id>>,
            Ok = Option<Amenity>,
            Err = Traced<database::Error>,
        > + Database<Update<Amenity>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Amenity;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateAmenity) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateAmenity {
            amenity_id,
            name,
            location,
            description,
            opening,
            closing,
            capacity,
            fee,
            image,
        } = cmd;

        let hours = TimeSlot::new(opening, closing)
            .map(amenity::Hours::from)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let capacity = amenity::Capacity::new(capacity)
            .ok_or(E::InvalidCapacity(capacity))
            .map_err(tracerr::wrap!())?;

        if let Some(fee) = &fee {
            if fee.amount.is_sign_negative() {
                return Err(tracerr::new!(E::NegativeFee(*fee)));
            }
        }

        let mut amenity = self
            .database()
            .execute(Select(By::<Option<Amenity>, _>::new(amenity_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AmenityNotExists(amenity_id))
            .map_err(tracerr::wrap!())?;

        amenity.name = name;
        amenity.location = location;
        amenity.description = description;
        amenity.hours = hours;
        amenity.capacity = capacity;
        amenity.fee = fee;
        amenity.image = image;

        self.database()
            .execute(Update(amenity.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(amenity)
    }
}

/// Error of [`UpdateAmenity`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Amenity`] with the provided ID does not exist.
    #[display("`Amenity(id: {_0})` does not exist")]
    AmenityNotExists(#[error(not(source))] amenity::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Provided capacity is zero.
    #[display("capacity must admit at least one booking, got {_0}")]
    InvalidCapacity(#[error(not(source))] u16),

    /// Provided opening/closing hours are empty or inverted.
    #[display("invalid operating hours: {_0}")]
    #[from]
    InvalidHours(InvalidTimeSlot),

    /// Provided fee is negative.
    #[display("fee must be non-negative, got {_0}")]
    NegativeFee(#[error(not(source))] Money),
}
