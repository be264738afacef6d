//! [`Command`] for creating a new [`Amenity`].

use common::{
    operations::Insert, timeslot::InvalidTimeSlot, DateTime, Money, TimeOfDay,
    TimeSlot,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{amenity, Amenity},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Amenity`].
#[derive(Clone, Debug)]
pub struct CreateAmenity {
    /// [`Name`] of a new [`Amenity`].
    ///
    /// [`Name`]: amenity::Name
    pub name: amenity::Name,

    /// [`Location`] of a new [`Amenity`].
    ///
    /// [`Location`]: amenity::Location
    pub location: amenity::Location,

    /// [`Description`] of a new [`Amenity`], if any.
    ///
    /// [`Description`]: amenity::Description
    pub description: Option<amenity::Description>,

    /// Opening time of a new [`Amenity`].
    pub opening: TimeOfDay,

    /// Closing time of a new [`Amenity`].
    pub closing: TimeOfDay,

    /// Maximum number of bookings per overlapping window.
    pub capacity: u16,

    /// Usage fee, if the [`Amenity`] charges one.
    pub fee: Option<Money>,

    /// Reference to an image, if any.
    pub image: Option<amenity::ImageRef>,
}

impl<Db> Command<CreateAmenity> for Service<Db>
where
    Db: Database<Insert<Amenity>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Amenity;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateAmenity) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateAmenity {
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

        let amenity = Amenity {
            id: amenity::Id::new(),
            name,
            location,
            description,
            hours,
            capacity,
            fee,
            image,
            created_at: DateTime::now().coerce(),
        };
        self.database()
            .execute(Insert(amenity.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(amenity)
    }
}

/// Error of [`CreateAmenity`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
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
