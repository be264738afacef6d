//! Payment [`Transaction`] read model definitions.

use common::Date;
use derive_more::{From, Into};

use crate::domain::{fee, user};
#[cfg(doc)]
use crate::domain::{Category, Transaction};

/// Billing period a settlement is scoped to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Period {
    /// Calendar year.
    pub year: i32,

    /// Calendar month (1-indexed).
    pub month: u8,
}

/// Returns the [`Period`] a "paid" check of the provided [`Frequency`] is
/// scoped to, as of the provided date.
///
/// Only MONTHLY fees are period-scoped: a completed payment settles them for
/// the calendar month of its paid date, and a fresh payment is owed every
/// month. Every other frequency — including QUARTERLY and YEARLY — is settled
/// forever by any completed payment, which mirrors the billing behavior this
/// service replaces.
///
/// [`Frequency`]: fee::Frequency
#[must_use]
pub fn period_of(frequency: fee::Frequency, today: Date) -> Option<Period> {
    use fee::Frequency as F;

    match frequency {
        F::Monthly => Some(Period {
            year: today.year(),
            month: today.month(),
        }),
        F::OneTime | F::Quarterly | F::Yearly => None,
    }
}

/// Indicator whether a [`Category`] is settled by a COMPLETED [`Transaction`].
#[derive(Clone, Copy, Debug, Eq, From, Into, PartialEq)]
pub struct Settled(pub bool);

/// Selector of a [`Settled`] indicator.
#[derive(Clone, Copy, Debug)]
pub struct SettledBy {
    /// ID of the fee [`Category`] being checked.
    pub category_id: fee::Id,

    /// ID of the resident whose payments count.
    pub resident_id: user::Id,

    /// [`Period`] the check is scoped to.
    ///
    /// [`None`] means any COMPLETED [`Transaction`] ever settles the
    /// [`Category`].
    pub period: Option<Period>,
}

/// Selector of all [`Transaction`]s of one resident.
#[derive(Clone, Copy, Debug)]
pub struct ForResident {
    /// ID of the resident.
    pub resident_id: user::Id,
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::Date;

    use crate::domain::fee::Frequency;

    use super::{period_of, Period};

    #[test]
    fn monthly_fees_are_scoped_to_the_calendar_month() {
        let today = Date::from_str("2025-02-15").unwrap();
        assert_eq!(
            period_of(Frequency::Monthly, today),
            Some(Period {
                year: 2025,
                month: 2,
            }),
        );
    }

    #[test]
    fn other_frequencies_are_settled_forever() {
        let today = Date::from_str("2025-02-15").unwrap();
        assert_eq!(period_of(Frequency::OneTime, today), None);
        assert_eq!(period_of(Frequency::Quarterly, today), None);
        assert_eq!(period_of(Frequency::Yearly, today), None);
    }
}
