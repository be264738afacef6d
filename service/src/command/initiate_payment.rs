//! [`Command`] for initiating a payment.

use common::{
    operations::{Commit, By, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{fee, payment, user, Category, Transaction},
    infra::{database, gateway, Database},
    Service,
};

use super::Command;

/// [`Command`] for initiating a payment of a fee [`Category`].
///
/// Creates a PENDING [`Transaction`] charged with the current gross amount of
/// the [`Category`] and returns the gateway redirect URL the resident settles
/// it through.
#[derive(Clone, Copy, Debug)]
pub struct InitiatePayment {
    /// ID of the fee [`Category`] to pay.
    pub category_id: fee::Id,

    /// ID of the paying resident.
    pub resident_id: user::Id,

    /// Payment [`Method`] to use.
    ///
    /// [`Method`]: payment::Method
    pub method: payment::Method,
}

/// Output of [`InitiatePayment`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Created PENDING [`Transaction`].
    pub transaction: Transaction,

    /// Gateway URL to settle the [`Transaction`] through.
    pub payment_url: gateway::PaymentUrl,
}

impl<Db> Command<InitiatePayment> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Category>, fee::Id>>,
            Ok = Option<Category>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<Insert<Transaction>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: InitiatePayment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let InitiatePayment {
            category_id,
            resident_id,
            method,
        } = cmd;

        let category = self
            .database()
            .execute(Select(By::<Option<Category>, _>::new(category_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CategoryNotExists(category_id))
            .map_err(tracerr::wrap!())?;

        // A locked category is invisible to residents, so paying it is
        // indistinguishable from paying a missing one.
        if !category.active {
            return Err(tracerr::new!(E::CategoryLocked(category_id)));
        }

        let transaction = Transaction {
            id: payment::Id::new(),
            category_id: category.id,
            resident_id,
            amount: category.gross(),
            method,
            status: payment::Status::Pending,
            external_ref: None,
            paid_at: None,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(transaction.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let payment_url = gateway::Vnpay::new(&self.config().gateway)
            .payment_url(&transaction, &category);

        Ok(Output {
            transaction,
            payment_url,
        })
    }
}

/// Error of [`InitiatePayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Fee [`Category`] with the provided ID is locked.
    #[display("`Category(id: {_0})` is locked")]
    CategoryLocked(#[error(not(source))] fee::Id),

    /// Fee [`Category`] with the provided ID does not exist.
    #[display("`Category(id: {_0})` does not exist")]
    CategoryNotExists(#[error(not(source))] fee::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
