//! [`Command`] for creating a new fee [`Category`].

use common::{operations::Insert, DateTime, Money, Percent};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{fee, user, Category},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new fee [`Category`].
#[derive(Clone, Debug)]
pub struct CreateFeeCategory {
    /// [`Name`] of a new [`Category`].
    ///
    /// [`Name`]: fee::Name
    pub name: fee::Name,

    /// Net amount charged per billing cycle.
    pub amount: Money,

    /// Tax percentage applied on top of the net amount.
    pub tax: Percent,

    /// Billing [`Frequency`] of a new [`Category`].
    ///
    /// [`Frequency`]: fee::Frequency
    pub frequency: fee::Frequency,

    /// [`Kind`] of a new [`Category`].
    ///
    /// [`Kind`]: fee::Kind
    pub kind: fee::Kind,

    /// Days before the charge is considered overdue.
    pub grace_period: fee::GracePeriod,

    /// Indicator whether the [`Category`] recurs.
    pub is_recurring: bool,

    /// ID of the resident the [`Category`] is addressed to, if not broadcast.
    pub resident_id: Option<user::Id>,

    /// [`Description`] of a new [`Category`], if any.
    ///
    /// [`Description`]: fee::Description
    pub description: Option<fee::Description>,
}

impl<Db> Command<CreateFeeCategory> for Service<Db>
where
    Db: Database<Insert<Category>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Category;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateFeeCategory,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateFeeCategory {
            name,
            amount,
            tax,
            frequency,
            kind,
            grace_period,
            is_recurring,
            resident_id,
            description,
        } = cmd;

        if amount.amount.is_sign_negative() {
            return Err(tracerr::new!(E::NegativeAmount(amount)));
        }

        let category = Category {
            id: fee::Id::new(),
            name,
            amount,
            tax,
            frequency,
            kind,
            grace_period,
            is_recurring,
            active: true,
            resident_id,
            description,
            created_at: DateTime::now().coerce(),
        };
        self.database()
            .execute(Insert(category.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(category)
    }
}

/// Error of [`CreateFeeCategory`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Provided amount is negative.
    #[display("amount must be non-negative, got {_0}")]
    NegativeAmount(#[error(not(source))] Money),
}
