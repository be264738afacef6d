//! Payment [`Transaction`] definitions.


#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{fee, user};

/// Attempt to settle a fee [`Category`] through a payment gateway.
///
/// [`Category`]: crate::domain::Category
#[derive(Clone, Debug)]
pub struct Transaction {
    /// ID of this [`Transaction`].
    pub id: Id,

    /// ID of the fee [`Category`] being settled.
    ///
    /// [`Category`]: crate::domain::Category
    pub category_id: fee::Id,

    /// ID of the resident [`User`] who pays.
    ///
    /// [`User`]: crate::domain::User
    pub resident_id: user::Id,

    /// Charged amount (the gross amount of the [`Category`] at initiation
    /// time).
    ///
    /// [`Category`]: crate::domain::Category
    pub amount: Money,

    /// Payment [`Method`] of this [`Transaction`].
    pub method: Method,

    /// [`Status`] of this [`Transaction`].
    pub status: Status,

    /// Reference assigned by the external gateway, if it reported one.
    pub external_ref: Option<ExternalRef>,

    /// [`DateTime`] when this [`Transaction`] was settled, if it was.
    pub paid_at: Option<SettlementDateTime>,

    /// [`DateTime`] when this [`Transaction`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a payment [`Transaction`].
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

/// Reference assigned to a [`Transaction`] by the external gateway.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct ExternalRef(String);

impl ExternalRef {
    /// Creates a new [`ExternalRef`] if the given `reference` is valid.
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Option<Self> {
        let reference = reference.into();
        Self::check(&reference).then_some(Self(reference))
    }

    /// Checks whether the given `reference` is a valid [`ExternalRef`].
    fn check(reference: impl AsRef<str>) -> bool {
        let reference = reference.as_ref();
        reference.trim() == reference
            && !reference.is_empty()
            && reference.len() <= 100
    }
}

impl FromStr for ExternalRef {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ExternalRef`")
    }
}

define_kind! {
    #[doc = "Payment method of a [`Transaction`]."]
    enum Method {
        #[doc = "VNPay gateway."]
        Vnpay = 1,

        #[doc = "MoMo wallet."]
        Momo = 2,
    }
}

define_kind! {
    #[doc = "Status of a payment [`Transaction`]."]
    enum Status {
        #[doc = "Awaiting the gateway outcome."]
        Pending = 1,

        #[doc = "Settled successfully."]
        Completed = 2,

        #[doc = "Declined or abandoned."]
        Failed = 3,

        #[doc = "Settled, then reversed."]
        Refunded = 4,
    }
}

impl Status {
    /// Indicates whether this [`Status`] may transition into the provided
    /// one.
    ///
    /// A [`Transaction`] is decided exactly once: [`Pending`] goes to
    /// [`Completed`] or [`Failed`], and a [`Completed`] one may later be
    /// [`Refunded`]. Every other move is rejected, including re-completing an
    /// already [`Completed`] [`Transaction`].
    ///
    /// [`Completed`]: Status::Completed
    /// [`Failed`]: Status::Failed
    /// [`Pending`]: Status::Pending
    /// [`Refunded`]: Status::Refunded
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        use Status as S;

        match (self, next) {
            (S::Pending, S::Completed | S::Failed)
            | (S::Completed, S::Refunded) => true,
            (S::Pending, S::Pending | S::Refunded)
            | (S::Completed, S::Pending | S::Completed | S::Failed)
            | (
                S::Failed | S::Refunded,
                S::Pending | S::Completed | S::Failed | S::Refunded,
            ) => false,
        }
    }
}

/// [`DateTime`] when a [`Transaction`] was created.
pub type CreationDateTime = DateTimeOf<(Transaction, unit::Creation)>;

/// [`DateTime`] when a [`Transaction`] was settled.
pub type SettlementDateTime = DateTimeOf<(Transaction, unit::Settlement)>;

#[cfg(test)]
mod spec {
    use super::Status;

    #[test]
    fn pending_is_decided_exactly_once() {
        assert!(Status::Pending.can_transition_to(Status::Completed));
        assert!(Status::Pending.can_transition_to(Status::Failed));
        assert!(!Status::Pending.can_transition_to(Status::Refunded));
        assert!(!Status::Pending.can_transition_to(Status::Pending));
    }

    #[test]
    fn completed_may_only_be_refunded() {
        assert!(Status::Completed.can_transition_to(Status::Refunded));
        assert!(!Status::Completed.can_transition_to(Status::Completed));
        assert!(!Status::Completed.can_transition_to(Status::Failed));
        assert!(!Status::Completed.can_transition_to(Status::Pending));
    }

    #[test]
    fn failed_and_refunded_are_terminal() {
        for next in [
            Status::Pending,
            Status::Completed,
            Status::Failed,
            Status::Refunded,
        ] {
            assert!(!Status::Failed.can_transition_to(next));
            assert!(!Status::Refunded.can_transition_to(next));
        }
    }
}
