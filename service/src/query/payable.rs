//! [`Query`] collection for the payable state of fee [`Category`]s.

use common::{
    operations::{By, Select},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{fee, user, Category},
    infra::{database, Database},
    read::{self, payment::period_of},
    Service,
};

use super::Query;

/// Active fee [`Category`] paired with its derived payable state.
#[derive(Clone, Debug)]
pub struct Payable {
    /// The [`Category`] itself.
    pub category: Category,

    /// Gross amount owed per billing cycle.
    pub gross: Money,

    /// Indicator whether the [`Category`] is settled for the current period.
    pub paid: bool,
}

/// [`Query`] for every active [`Category`] addressed to a resident, paired
/// with its gross amount and paid state.
///
/// The single call both clients need instead of cross-referencing categories
/// against transactions on their own.
#[derive(Clone, Copy, Debug)]
pub struct PayableCategories {
    /// ID of the resident to list payable [`Category`]s of.
    pub resident_id: user::Id,
}

impl<Db> Query<PayableCategories> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Category>, read::fee::list::Filter>>,
            Ok = Vec<Category>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::payment::Settled, read::payment::SettledBy>>,
            Ok = read::payment::Settled,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<Payable>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        query: PayableCategories,
    ) -> Result<Self::Ok, Self::Err> {
        let PayableCategories { resident_id } = query;

        let categories = self
            .database()
            .execute(Select(By::new(read::fee::list::Filter {
                active: Some(true),
                resident_id: Some(resident_id),
            })))
            .await
            .map_err(tracerr::wrap!())?;

        let today = DateTime::now().date();
        let mut payables = Vec::with_capacity(categories.len());
        for category in categories {
            let read::payment::Settled(paid) = self
                .database()
                .execute(Select(By::new(read::payment::SettledBy {
                    category_id: category.id,
                    resident_id,
                    period: period_of(category.frequency, today),
                })))
                .await
                .map_err(tracerr::wrap!())?;

            payables.push(Payable {
                gross: category.gross(),
                category,
                paid,
            });
        }

        Ok(payables)
    }
}

/// [`Query`] checking whether a fee [`Category`] is paid for the current
/// billing period.
///
/// MONTHLY categories are settled by a COMPLETED transaction with a paid date
/// in the current calendar month; every other frequency by any COMPLETED
/// transaction at all.
#[derive(Clone, Copy, Debug)]
pub struct IsPaid {
    /// ID of the fee [`Category`] to check.
    pub category_id: fee::Id,

    /// ID of the resident whose payments count.
    pub resident_id: user::Id,
}

impl<Db> Query<IsPaid> for Service<Db>
where
    Db: Database<
            Select<By<Option<Category>, fee::Id>>,
            Ok = Option<Category>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::payment::Settled, read::payment::SettledBy>>,
            Ok = read::payment::Settled,
            Err = Traced<database::Error>,
        >,
{
    type Ok = bool;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: IsPaid) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let IsPaid {
            category_id,
            resident_id,
        } = query;

        let category = self
            .database()
            .execute(Select(By::<Option<Category>, _>::new(category_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CategoryNotExists(category_id))
            .map_err(tracerr::wrap!())?;

        let read::payment::Settled(paid) = self
            .database()
            .execute(Select(By::new(read::payment::SettledBy {
                category_id: category.id,
                resident_id,
                period: period_of(category.frequency, DateTime::now().date()),
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(paid)
    }
}

/// Error of [`IsPaid`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Fee [`Category`] with the provided ID does not exist.
    #[display("`Category(id: {_0})` does not exist")]
    CategoryNotExists(#[error(not(source))] fee::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
