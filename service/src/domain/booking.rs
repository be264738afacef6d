//! [`Booking`] definitions.


#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, Date, DateTimeOf, TimeSlot};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Amenity;
use crate::domain::{amenity, user};

/// Reservation of an [`Amenity`] time slot by a resident.
#[derive(Clone, Debug)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// ID of the booked [`Amenity`].
    pub amenity_id: amenity::Id,

    /// ID of the resident [`User`] who booked.
    ///
    /// [`User`]: crate::domain::User
    pub resident_id: user::Id,

    /// [`Date`] this [`Booking`] was submitted on.
    pub booked_on: Date,

    /// [`Date`] the [`Amenity`] will be used on.
    pub usage_date: Date,

    /// Reserved [`TimeSlot`].
    pub slot: TimeSlot,

    /// Free-form [`Note`] attached by the resident, if any.
    pub note: Option<Note>,

    /// [`Status`] of this [`Booking`].
    pub status: Status,

    /// [`DateTime`] when this [`Booking`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Booking`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Free-form note attached to a [`Booking`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Note(String);

impl Note {
    /// Creates a new [`Note`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `note` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(note: impl Into<String>) -> Self {
        Self(note.into())
    }

    /// Creates a new [`Note`] if the given `note` is valid.
    #[must_use]
    pub fn new(note: impl Into<String>) -> Option<Self> {
        let note = note.into();
        Self::check(&note).then_some(Self(note))
    }

    /// Checks whether the given `note` is a valid [`Note`].
    fn check(note: impl AsRef<str>) -> bool {
        let note = note.as_ref();
        note.trim() == note && !note.is_empty() && note.len() <= 2048
    }
}

impl FromStr for Note {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Note`")
    }
}

define_kind! {
    #[doc = "Status of a [`Booking`]."]
    enum Status {
        #[doc = "Submitted, not decided upon yet."]
        New = 1,

        #[doc = "Approved by an administrator."]
        Approved = 2,

        #[doc = "Rejected by an administrator."]
        Rejected = 3,
    }
}

impl Status {
    /// Indicates whether this [`Status`] may transition into the provided
    /// one.
    ///
    /// [`New`] may go to [`Approved`] or [`Rejected`]; an administrator may
    /// change their mind between [`Approved`] and [`Rejected`] at any time,
    /// and re-affirming the current status is always permitted. Nothing ever
    /// returns to [`New`].
    ///
    /// [`Approved`]: Status::Approved
    /// [`New`]: Status::New
    /// [`Rejected`]: Status::Rejected
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        use Status as S;

        match (self, next) {
            (S::New | S::Approved | S::Rejected, S::Approved | S::Rejected) => {
                true
            }
            (S::New, S::New) => true,
            (S::Approved | S::Rejected, S::New) => false,
        }
    }

    /// Indicates whether this [`Status`] still occupies capacity.
    ///
    /// [`New`] and [`Approved`] bookings both count against an [`Amenity`]'s
    /// capacity; only [`Rejected`] ones free their window.
    ///
    /// [`Approved`]: Status::Approved
    /// [`New`]: Status::New
    /// [`Rejected`]: Status::Rejected
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, Self::New | Self::Approved)
    }
}

/// [`DateTime`] when a [`Booking`] was created.
pub type CreationDateTime = DateTimeOf<(Booking, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::Status;

    #[test]
    fn new_bookings_may_be_decided_either_way() {
        assert!(Status::New.can_transition_to(Status::Approved));
        assert!(Status::New.can_transition_to(Status::Rejected));
        assert!(Status::New.can_transition_to(Status::New));
    }

    #[test]
    fn decisions_are_revisable_but_never_reset() {
        assert!(Status::Approved.can_transition_to(Status::Rejected));
        assert!(Status::Rejected.can_transition_to(Status::Approved));
        assert!(Status::Approved.can_transition_to(Status::Approved));
        assert!(Status::Rejected.can_transition_to(Status::Rejected));

        assert!(!Status::Approved.can_transition_to(Status::New));
        assert!(!Status::Rejected.can_transition_to(Status::New));
    }

    #[test]
    fn only_rejected_bookings_release_capacity() {
        assert!(Status::New.is_open());
        assert!(Status::Approved.is_open());
        assert!(!Status::Rejected.is_open());
    }
}
