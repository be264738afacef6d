//! Time-of-day values and [`TimeSlot`] intervals.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{fmt, str::FromStr, time::Duration};

use derive_more::{Display, Error};
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{format_description::BorrowedFormatItem, macros::format_description};

/// Format of a [`TimeOfDay`] string representation.
const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");

/// Short format of a [`TimeOfDay`] string representation, without seconds.
const SHORT_TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]");

/// Wall-clock time of day with a second resolution.
///
/// Carries no timezone: values are treated as local venue time, and are only
/// ever compared with each other.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimeOfDay(time::Time);

impl TimeOfDay {
    /// Creates a new [`TimeOfDay`] from the provided components.
    ///
    /// [`None`] is returned if any component is out of range.
    #[must_use]
    pub fn new(hour: u8, minute: u8, second: u8) -> Option<Self> {
        time::Time::from_hms(hour, minute, second).ok().map(Self)
    }

    /// Returns the number of whole seconds since midnight.
    #[must_use]
    pub fn seconds_since_midnight(&self) -> u32 {
        u32::from(self.0.hour()) * 3600
            + u32::from(self.0.minute()) * 60
            + u32::from(self.0.second())
    }

    /// Returns this [`TimeOfDay`] advanced by the provided [`Duration`],
    /// clamped to the provided `max`.
    ///
    /// Clamping keeps window arithmetic inside a venue's operating hours:
    /// advancing past `max` yields `max` rather than wrapping past midnight.
    #[must_use]
    pub fn advance_clamped(&self, by: Duration, max: Self) -> Self {
        let advanced = Self(self.0 + by);
        // `time::Time` addition wraps around midnight, so a wrapped value
        // comparing below `self` has overflown the day.
        if advanced < *self || advanced > max {
            max
        } else {
            advanced
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self
            .0
            .format(&TIME_FORMAT)
            .unwrap_or_else(|e| panic!("cannot format `TimeOfDay`: {e}"));
        write!(f, "{formatted}")
    }
}

impl FromStr for TimeOfDay {
    type Err = time::error::Parse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        time::Time::parse(s, &TIME_FORMAT)
            .or_else(|_| time::Time::parse(s, &SHORT_TIME_FORMAT))
            .map(Self)
    }
}

impl From<time::Time> for TimeOfDay {
    fn from(t: time::Time) -> Self {
        Self(t)
    }
}

impl From<TimeOfDay> for time::Time {
    fn from(t: TimeOfDay) -> Self {
        t.0
    }
}

#[cfg(feature = "postgres")]
impl FromSql<'_> for TimeOfDay {
    accepts!(TIME);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::Time::from_sql(ty, raw).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl ToSql for TimeOfDay {
    accepts!(TIME);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, w)
    }
}

#[cfg(feature = "serde")]
mod time_of_day_serde {
    //! [`TimeOfDay`] serialization as an `HH:MM:SS` string.

    use std::str::FromStr as _;

    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    use super::TimeOfDay;

    impl serde::Serialize for TimeOfDay {
        fn serialize<S: Serializer>(
            &self,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for TimeOfDay {
        fn deserialize<D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            Self::from_str(&s).map_err(|e| {
                D::Error::custom(format!("invalid `TimeOfDay`: {e}"))
            })
        }
    }
}

/// Half-open `[start, end)` interval of [`TimeOfDay`] values.
///
/// The `start < end` invariant holds by construction, so two slots touching
/// at a boundary never overlap.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TimeSlot {
    /// Inclusive start of this [`TimeSlot`].
    start: TimeOfDay,

    /// Exclusive end of this [`TimeSlot`].
    end: TimeOfDay,
}

impl TimeSlot {
    /// Creates a new [`TimeSlot`] from the provided bounds.
    ///
    /// # Errors
    ///
    /// With an [`InvalidTimeSlot`] if `start >= end`.
    pub fn new(
        start: TimeOfDay,
        end: TimeOfDay,
    ) -> Result<Self, InvalidTimeSlot> {
        if start >= end {
            return Err(InvalidTimeSlot { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the inclusive start of this [`TimeSlot`].
    #[must_use]
    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    /// Returns the exclusive end of this [`TimeSlot`].
    #[must_use]
    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    /// Indicates whether this [`TimeSlot`] overlaps the `other` one.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Indicates whether this [`TimeSlot`] fully encloses the `other` one.
    #[must_use]
    pub fn encloses(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns the [`Duration`] of this [`TimeSlot`].
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(
            self.end.seconds_since_midnight()
                - self.start.seconds_since_midnight(),
        ))
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { start, end } = self;
        write!(f, "{start}..{end}")
    }
}

/// Error of constructing a [`TimeSlot`] with `start >= end`.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("invalid time slot: {start} >= {end}")]
pub struct InvalidTimeSlot {
    /// Requested start of the [`TimeSlot`].
    pub start: TimeOfDay,

    /// Requested end of the [`TimeSlot`].
    pub end: TimeOfDay,
}

#[cfg(test)]
mod spec {
    use std::{str::FromStr as _, time::Duration};

    use super::{TimeOfDay, TimeSlot};

    fn tod(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn slot(start: &str, end: &str) -> TimeSlot {
        TimeSlot::new(tod(start), tod(end)).unwrap()
    }

    #[test]
    fn parses_with_and_without_seconds() {
        assert_eq!(tod("08:30:15").to_string(), "08:30:15");
        assert_eq!(tod("08:30").to_string(), "08:30:00");
        assert!(TimeOfDay::from_str("25:00").is_err());
        assert!(TimeOfDay::from_str("8h30").is_err());
    }

    #[test]
    fn rejects_empty_and_inverted_slots() {
        assert!(TimeSlot::new(tod("10:00"), tod("10:00")).is_err());
        assert!(TimeSlot::new(tod("11:00"), tod("10:00")).is_err());
    }

    #[test]
    fn touching_slots_do_not_overlap() {
        let morning = slot("08:00", "10:00");
        let midday = slot("10:00", "12:00");
        assert!(!morning.overlaps(&midday));
        assert!(!midday.overlaps(&morning));
    }

    #[test]
    fn intersecting_and_nested_slots_overlap() {
        let outer = slot("08:00", "12:00");
        let crossing = slot("11:00", "13:00");
        let nested = slot("09:00", "10:00");
        assert!(outer.overlaps(&crossing));
        assert!(crossing.overlaps(&outer));
        assert!(outer.overlaps(&nested));
        assert!(nested.overlaps(&outer));
        assert!(outer.overlaps(&outer));
    }

    #[test]
    fn enclosure_is_inclusive_of_bounds() {
        let hours = slot("06:00", "22:00");
        assert!(hours.encloses(&slot("06:00", "22:00")));
        assert!(hours.encloses(&slot("06:00", "07:00")));
        assert!(hours.encloses(&slot("21:00", "22:00")));
        assert!(!hours.encloses(&slot("05:59", "07:00")));
        assert!(!hours.encloses(&slot("21:00", "22:01")));
    }

    #[test]
    fn duration_spans_the_half_open_interval() {
        assert_eq!(
            slot("08:00", "09:30").duration(),
            Duration::from_secs(90 * 60),
        );
    }

    #[test]
    fn advancing_clamps_to_the_provided_maximum() {
        let closing = tod("22:00");
        assert_eq!(
            tod("20:00").advance_clamped(Duration::from_secs(3600), closing),
            tod("21:00"),
        );
        assert_eq!(
            tod("21:30").advance_clamped(Duration::from_secs(3600), closing),
            closing,
        );
        // Advancing past midnight must not wrap around below the start.
        assert_eq!(
            tod("23:30").advance_clamped(Duration::from_secs(3600), closing),
            closing,
        );
    }
}
