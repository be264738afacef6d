//! [`Command`] for updating a fee [`Category`].

use common::{
    operations::{By, Select, Update},
    Money, Percent,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{fee, user, Category},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating an existing fee [`Category`].
#[derive(Clone, Debug)]
pub struct UpdateFeeCategory {
    /// ID of the [`Category`] to update.
    pub category_id: fee::Id,

    /// New [`Name`] of the [`Category`].
    ///
    /// [`Name`]: fee::Name
    pub name: fee::Name,

    /// New net amount charged per billing cycle.
    pub amount: Money,

    /// New tax percentage.
    pub tax: Percent,

    /// New billing [`Frequency`].
    ///
    /// [`Frequency`]: fee::Frequency
    pub frequency: fee::Frequency,

    /// New [`Kind`] of the [`Category`].
    ///
    /// [`Kind`]: fee::Kind
    pub kind: fee::Kind,

    /// New grace period.
    pub grace_period: fee::GracePeriod,

    /// New recurrence indicator.
    pub is_recurring: bool,

    /// New addressee of the [`Category`], if not broadcast.
    pub resident_id: Option<user::Id>,

    /// New [`Description`] of the [`Category`], if any.
    ///
    /// [`Description`]: fee::Description
    pub description: Option<fee::Description>,
}

impl<Db> Command<UpdateFeeCategory> for Service<Db>
where
    Db: Database<
            Select<By<Option<Category>, fee::Id>>,
            Ok = Option<Category>,
            Err = Traced<database::Error>,
        > + Database<Update<Category>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Category;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateFeeCategory,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateFeeCategory {
            category_id,
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

        let mut category = self
            .database()
            .execute(Select(By::<Option<Category>, _>::new(category_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CategoryNotExists(category_id))
            .map_err(tracerr::wrap!())?;

        category.name = name;
        category.amount = amount;
        category.tax = tax;
        category.frequency = frequency;
        category.kind = kind;
        category.grace_period = grace_period;
        category.is_recurring = is_recurring;
        category.resident_id = resident_id;
        category.description = description;

        self.database()
            .execute(Update(category.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(category)
    }
}

/// Error of [`UpdateFeeCategory`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Category`] with the provided ID does not exist.
    #[display("`Category(id: {_0})` does not exist")]
    CategoryNotExists(#[error(not(source))] fee::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Provided amount is negative.
    #[display("amount must be non-negative, got {_0}")]
    NegativeAmount(#[error(not(source))] Money),
}
