//! Fee [`Category`] definitions.


#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money, Percent};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;

/// Billable charge type assigned to a resident.
#[derive(Clone, Debug)]
pub struct Category {
    /// ID of this [`Category`].
    pub id: Id,

    /// [`Name`] of this [`Category`].
    pub name: Name,

    /// Net amount charged per billing cycle.
    pub amount: Money,

    /// Tax percentage applied on top of the net amount.
    pub tax: Percent,

    /// Billing [`Frequency`] of this [`Category`].
    pub frequency: Frequency,

    /// [`Kind`] of this [`Category`].
    pub kind: Kind,

    /// Days after the due date before the charge is considered overdue.
    pub grace_period: GracePeriod,

    /// Indicator whether this [`Category`] recurs.
    pub is_recurring: bool,

    /// Indicator whether this [`Category`] is payable.
    ///
    /// Deactivated categories are locked: residents can neither view nor pay
    /// them.
    pub active: bool,

    /// ID of the resident [`User`] this [`Category`] is addressed to.
    ///
    /// [`None`] means the [`Category`] is broadcast to every resident.
    ///
    /// [`User`]: crate::domain::User
    pub resident_id: Option<user::Id>,

    /// [`Description`] of this [`Category`], if any.
    pub description: Option<Description>,

    /// [`DateTime`] when this [`Category`] was created.
    pub created_at: CreationDateTime,
}

impl Category {
    /// Returns the gross amount of this [`Category`]: the net amount plus
    /// tax, rounded half away from zero to whole currency units.
    #[must_use]
    pub fn gross(&self) -> Money {
        let tax = Money {
            amount: self.tax.of(self.amount.amount),
            currency: self.amount.currency,
        }
        .round_to_unit();

        Money {
            amount: self.amount.amount + tax.amount,
            currency: self.amount.currency,
        }
    }
}

/// ID of a fee [`Category`].
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

/// Name of a fee [`Category`].
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
        name.trim() == name && !name.is_empty() && name.len() <= 100
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Description of a fee [`Category`].
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

/// Number of days after the due date before a charge is overdue.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    Into,
    PartialEq,
    Serialize,
)]
pub struct GracePeriod(u16);

define_kind! {
    #[doc = "Billing frequency of a fee [`Category`]."]
    enum Frequency {
        #[doc = "Charged exactly once."]
        OneTime = 1,

        #[doc = "Charged every calendar month."]
        Monthly = 2,

        #[doc = "Charged every quarter."]
        Quarterly = 3,

        #[doc = "Charged every year."]
        Yearly = 4,
    }
}

define_kind! {
    #[doc = "Kind of a fee [`Category`]."]
    enum Kind {
        #[doc = "Upkeep of the building and shared infrastructure."]
        Maintenance = 1,

        #[doc = "Metered utilities (water, electricity)."]
        Utility = 2,

        #[doc = "Optional services (parking, amenities, cleaning)."]
        Service = 3,
    }
}

/// [`DateTime`] when a fee [`Category`] was created.
pub type CreationDateTime = DateTimeOf<(Category, unit::Creation)>;

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{money::Currency, DateTime, Money, Percent};
    use rust_decimal::Decimal;

    use super::{Category, Frequency, GracePeriod, Id, Kind, Name};

    fn category(amount: i64, tax: &str) -> Category {
        Category {
            id: Id::new(),
            name: Name::new("Management fee").unwrap(),
            amount: Money {
                amount: Decimal::from(amount),
                currency: Currency::Vnd,
            },
            tax: Percent::from_str(tax).unwrap(),
            frequency: Frequency::Monthly,
            kind: Kind::Maintenance,
            grace_period: GracePeriod::from(7),
            is_recurring: true,
            active: true,
            resident_id: None,
            description: None,
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn gross_adds_rounded_tax() {
        let gross = category(1_000_000, "10").gross();
        assert_eq!(gross.amount, Decimal::from(1_100_000));
    }

    #[test]
    fn gross_rounds_half_away_from_zero() {
        // 5% of 1_000_009 is 50_000.45, which rounds down…
        assert_eq!(
            category(1_000_009, "5").gross().amount,
            Decimal::from(1_050_009),
        );
        // …while 5% of 1_000_010 is 50_000.5, which rounds up.
        assert_eq!(
            category(1_000_010, "5").gross().amount,
            Decimal::from(1_050_011),
        );
    }

    #[test]
    fn zero_tax_charges_the_net_amount() {
        assert_eq!(
            category(50_000, "0").gross().amount,
            Decimal::from(50_000),
        );
    }
}
