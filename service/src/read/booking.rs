//! [`Booking`] read model definitions.

use common::{Date, TimeOfDay, TimeSlot};
use derive_more::{From, Into};

use crate::domain::{amenity, user};
#[cfg(doc)]
use crate::domain::{Amenity, Booking};

/// Selector of open [`Booking`]s whose slot overlaps the given one.
#[derive(Clone, Copy, Debug)]
pub struct Overlapping {
    /// ID of the [`Amenity`] being booked.
    pub amenity_id: amenity::Id,

    /// [`Date`] the [`Amenity`] is used on.
    pub usage_date: Date,

    /// Requested [`TimeSlot`].
    pub slot: TimeSlot,
}

/// Number of open (NEW or APPROVED) [`Booking`]s in an overlapping window.
#[derive(Clone, Copy, Debug, Eq, From, Into, PartialEq)]
pub struct OpenCount(pub i64);

/// Selector detecting a duplicate [`Booking`] submission.
///
/// The tuple (amenity, resident, usage date, start time) is unique: the same
/// resident cannot book the same amenity twice starting at the same moment of
/// the same day.
#[derive(Clone, Copy, Debug)]
pub struct DuplicateStart {
    /// ID of the [`Amenity`] being booked.
    pub amenity_id: amenity::Id,

    /// ID of the booking resident.
    pub resident_id: user::Id,

    /// [`Date`] the [`Amenity`] is used on.
    pub usage_date: Date,

    /// Requested start time.
    pub start: TimeOfDay,
}

/// Indicator of a duplicate [`Booking`] submission.
#[derive(Clone, Copy, Debug, Eq, From, Into, PartialEq)]
pub struct IsDuplicate(pub bool);

/// Selector of all [`Booking`]s of one [`Amenity`] on one [`Date`].
#[derive(Clone, Copy, Debug)]
pub struct OnDate {
    /// ID of the [`Amenity`].
    pub amenity_id: amenity::Id,

    /// [`Date`] of usage.
    pub usage_date: Date,
}

/// Indicator whether any open [`Booking`]s reference an [`Amenity`].
#[derive(Clone, Copy, Debug, Eq, From, Into, PartialEq)]
pub struct HasOpen(pub bool);

pub mod list {
    //! [`Booking`]s list definitions.

    use common::define_pagination;

    use crate::domain::{amenity, booking, user};
    #[cfg(doc)]
    use crate::domain::Booking;

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = booking::Id;

    /// Cursor pointing to a specific [`Booking`] in a list.
    ///
    /// The list is keyset-ordered by `(usage_date, id)` ascending, so
    /// re-reading from a cursor restarts the sequence exactly where it
    /// stopped.
    pub type Cursor = booking::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// [`amenity::Id`] to list [`Booking`]s of.
        pub amenity_id: Option<amenity::Id>,

        /// [`user::Id`] of the resident to list [`Booking`]s of.
        pub resident_id: Option<user::Id>,
    }
}
