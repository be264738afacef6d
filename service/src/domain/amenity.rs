//! [`Amenity`] definitions.


#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf, Money, TimeSlot};
use derive_more::{AsRef, Deref, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shared facility (a pool, a gym, a hall) residents reserve time slots for.
#[derive(Clone, Debug)]
pub struct Amenity {
    /// ID of this [`Amenity`].
    pub id: Id,

    /// [`Name`] of this [`Amenity`].
    pub name: Name,

    /// [`Location`] of this [`Amenity`].
    pub location: Location,

    /// [`Description`] of this [`Amenity`], if any.
    pub description: Option<Description>,

    /// Operating [`Hours`] of this [`Amenity`].
    pub hours: Hours,

    /// Maximum number of bookings sharing one overlapping window.
    pub capacity: Capacity,

    /// Usage fee of this [`Amenity`], if it charges one.
    pub fee: Option<Money>,

    /// Reference to an image of this [`Amenity`], if any.
    pub image: Option<ImageRef>,

    /// [`DateTime`] when this [`Amenity`] was created.
    pub created_at: CreationDateTime,
}

/// ID of an [`Amenity`].
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

/// Name of an [`Amenity`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 255
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Location of an [`Amenity`] inside the compound.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Location(String);

impl Location {
    /// Creates a new [`Location`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `location` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    /// Creates a new [`Location`] if the given `location` is valid.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        Self::check(&location).then_some(Self(location))
    }

    /// Checks whether the given `location` is a valid [`Location`].
    fn check(location: impl AsRef<str>) -> bool {
        let location = location.as_ref();
        location.trim() == location
            && !location.is_empty()
            && location.len() <= 255
    }
}

impl FromStr for Location {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Location`")
    }
}

/// Description of an [`Amenity`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `description` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(description: impl Into<String>) -> Self {
        Self(description.into())
    }

    /// Creates a new [`Description`] if the given `description` is valid.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Option<Self> {
        let description = description.into();
        Self::check(&description).then_some(Self(description))
    }

    /// Checks whether the given `description` is a valid [`Description`].
    fn check(description: impl AsRef<str>) -> bool {
        let description = description.as_ref();
        description.trim() == description
            && !description.is_empty()
            && description.len() <= 2048
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// Operating hours of an [`Amenity`].
///
/// Wraps a [`TimeSlot`], so the opening-before-closing invariant holds by
/// construction.
#[derive(Clone, Copy, Debug, Deref, Eq, From, Into, PartialEq)]
pub struct Hours(TimeSlot);

impl Hours {
    /// Indicates whether the provided [`TimeSlot`] fits inside these
    /// [`Hours`].
    #[must_use]
    pub fn admits(&self, slot: &TimeSlot) -> bool {
        self.0.encloses(slot)
    }
}

/// Maximum number of bookings an [`Amenity`] admits per overlapping window.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize,
)]
pub struct Capacity(u16);

impl Capacity {
    /// Creates a new [`Capacity`] if the given `value` is at least `1`.
    #[must_use]
    pub fn new(value: u16) -> Option<Self> {
        (value >= 1).then_some(Self(value))
    }

    /// Returns this [`Capacity`] as a plain number.
    #[must_use]
    pub fn get(self) -> u16 {
        self.0
    }
}

/// Reference to an externally hosted image of an [`Amenity`].
#[derive(AsRef, Clone, Debug, Display, Eq, From, Into, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct ImageRef(String);

/// [`DateTime`] when an [`Amenity`] was created.
pub type CreationDateTime = DateTimeOf<(Amenity, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::{TimeSlot, TimeOfDay};

    use super::{Capacity, Hours};

    fn slot(start: &str, end: &str) -> TimeSlot {
        TimeSlot::new(
            start.parse::<TimeOfDay>().unwrap(),
            end.parse::<TimeOfDay>().unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn hours_admit_contained_slots_only() {
        let hours = Hours::from(slot("06:00", "22:00"));
        assert!(hours.admits(&slot("06:00", "07:00")));
        assert!(hours.admits(&slot("21:00", "22:00")));
        assert!(!hours.admits(&slot("05:00", "07:00")));
        assert!(!hours.admits(&slot("21:30", "22:30")));
    }

    #[test]
    fn capacity_must_be_positive() {
        assert!(Capacity::new(0).is_none());
        assert_eq!(Capacity::new(3).map(Capacity::get), Some(3));
    }
}
