//! [`Command`] for refunding a payment [`Transaction`].

use common::operations::{By, Commit, Lock, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{payment, Transaction},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for transitioning a COMPLETED [`Transaction`] into REFUNDED.
///
/// The only move a settled [`Transaction`] still permits. The settlement date
/// is kept: a refunded payment no longer settles its category, but the record
/// of when it was paid stays.
#[derive(Clone, Copy, Debug)]
pub struct RefundPayment {
    /// ID of the [`Transaction`] to refund.
    pub transaction_id: payment::Id,
}

impl<Db> Command<RefundPayment> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Transaction, payment::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Transaction>, payment::Id>>,
            Ok = Option<Transaction>,
            Err = Traced<database::Error>,
        > + Database<Update<Transaction>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Transaction;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RefundPayment) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RefundPayment { transaction_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(transaction_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut transaction = tx
            .execute(Select(By::<Option<Transaction>, _>::new(transaction_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TransactionNotExists(transaction_id))
            .map_err(tracerr::wrap!())?;

        if !transaction
            .status
            .can_transition_to(payment::Status::Refunded)
        {
            return Err(tracerr::new!(E::InvalidTransition {
                from: transaction.status,
                to: payment::Status::Refunded,
            }));
        }

        transaction.status = payment::Status::Refunded;
        tx.execute(Update(transaction.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(transaction)
    }
}

/// Error of [`RefundPayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Requested transition violates the [`Transaction`] status workflow.
    #[display("`Transaction` status cannot go from {from} to {to}")]
    InvalidTransition {
        /// Current [`Status`] of the [`Transaction`].
        ///
        /// [`Status`]: payment::Status
        from: payment::Status,

        /// Requested [`Status`].
        ///
        /// [`Status`]: payment::Status
        to: payment::Status,
    },

    /// [`Transaction`] with the provided ID does not exist.
    #[display("`Transaction(id: {_0})` does not exist")]
    TransactionNotExists(#[error(not(source))] payment::Id),
}
