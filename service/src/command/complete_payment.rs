//! [`Command`] for completing a payment [`Transaction`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{payment, Transaction},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for transitioning a PENDING [`Transaction`] into COMPLETED.
///
/// Fired by the gateway callback (or an administrative override). The
/// transition is guarded by the current status inside one transaction, so a
/// duplicate callback fails instead of double-completing.
#[derive(Clone, Debug)]
pub struct CompletePayment {
    /// ID of the [`Transaction`] to complete.
    pub transaction_id: payment::Id,

    /// Reference reported by the external gateway, if any.
    pub external_ref: Option<payment::ExternalRef>,
}

impl<Db> Command<CompletePayment> for Service<Db>
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

    async fn execute(
        &self,
        cmd: CompletePayment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CompletePayment {
            transaction_id,
            external_ref,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serializes concurrent gateway callbacks upon the same transaction.
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
            .can_transition_to(payment::Status::Completed)
        {
            return Err(tracerr::new!(E::InvalidTransition {
                from: transaction.status,
                to: payment::Status::Completed,
            }));
        }

        transaction.status = payment::Status::Completed;
        transaction.paid_at = Some(DateTime::now().coerce());
        transaction.external_ref = external_ref;
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

/// Error of [`CompletePayment`] [`Command`] execution.
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

#[cfg(test)]
mod spec {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    use common::{
        money::Currency,
        operations::{By, Commit, Lock, Select, Transact, Update},
        DateTime, Money,
    };
    use rust_decimal::Decimal;
    use secrecy::SecretString;
    use tracerr::Traced;

    use crate::{
        domain::{fee, payment, user, Transaction},
        infra::{database, gateway, Database},
        task, Config, Service,
    };

    use super::{Command as _, CompletePayment, ExecutionError as E};

    /// In-memory [`Database`] double backing the transaction ledger.
    #[derive(Clone, Debug, Default)]
    struct FakeDb {
        transactions: Arc<Mutex<HashMap<payment::Id, Transaction>>>,
    }

    impl Database<Transact> for FakeDb {
        type Ok = Self;
        type Err = Traced<database::Error>;

        async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
            Ok(self.clone())
        }
    }

    impl Database<Commit> for FakeDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
            Ok(())
        }
    }

    impl Database<Lock<By<Transaction, payment::Id>>> for FakeDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            _: Lock<By<Transaction, payment::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok(())
        }
    }

    impl Database<Select<By<Option<Transaction>, payment::Id>>> for FakeDb {
        type Ok = Option<Transaction>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Option<Transaction>, payment::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok(self
                .transactions
                .lock()
                .unwrap()
                .get(&by.into_inner())
                .cloned())
        }
    }

    impl Database<Update<Transaction>> for FakeDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Update(transaction): Update<Transaction>,
        ) -> Result<Self::Ok, Self::Err> {
            _ = self
                .transactions
                .lock()
                .unwrap()
                .insert(transaction.id, transaction);
            Ok(())
        }
    }

    // Required by the background task the `Service` spawns on startup.
    impl Database<Update<By<Transaction, payment::CreationDateTime>>>
        for FakeDb
    {
        type Ok = u64;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            _: Update<By<Transaction, payment::CreationDateTime>>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok(0)
        }
    }

    fn config() -> Config {
        Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(b"test"),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(b"test"),
            gateway: gateway::Config {
                payment_url: "https://gateway.test/pay".to_owned(),
                tmn_code: "TEST0001".to_owned(),
                hash_secret: SecretString::from("test".to_owned()),
                return_url: "https://app.test/return".to_owned(),
            },
            expire_pending_payments: task::expire_pending_payments::Config {
                interval: std::time::Duration::from_secs(60),
                timeout: std::time::Duration::from_secs(60),
            },
        }
    }

    fn pending() -> Transaction {
        Transaction {
            id: payment::Id::new(),
            category_id: fee::Id::new(),
            resident_id: user::Id::new(),
            amount: Money {
                amount: Decimal::from(1_100_000),
                currency: Currency::Vnd,
            },
            method: payment::Method::Vnpay,
            status: payment::Status::Pending,
            external_ref: None,
            paid_at: None,
            created_at: DateTime::now().coerce(),
        }
    }

    fn service_with(transaction: &Transaction) -> Service<FakeDb> {
        let db = FakeDb::default();
        _ = db
            .transactions
            .lock()
            .unwrap()
            .insert(transaction.id, transaction.clone());
        let (service, _bg) = Service::new(config(), db);
        service
    }

    #[tokio::test]
    async fn completes_a_pending_transaction_once() {
        let transaction = pending();
        let service = service_with(&transaction);

        let completed = service
            .execute(CompletePayment {
                transaction_id: transaction.id,
                external_ref: payment::ExternalRef::new("VNP123456"),
            })
            .await
            .unwrap();
        assert_eq!(completed.status, payment::Status::Completed);
        assert!(completed.paid_at.is_some());

        // A duplicate gateway callback must fail without touching the
        // settlement date.
        let err = service
            .execute(CompletePayment {
                transaction_id: transaction.id,
                external_ref: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), E::InvalidTransition { .. }));

        let stored = service
            .database()
            .transactions
            .lock()
            .unwrap()
            .get(&transaction.id)
            .cloned()
            .unwrap();
        assert_eq!(stored.paid_at, completed.paid_at);
        assert_eq!(
            stored.external_ref.as_ref().map(ToString::to_string),
            Some("VNP123456".to_owned()),
        );
    }

    #[tokio::test]
    async fn fails_for_an_unknown_transaction() {
        let service = service_with(&pending());

        let err = service
            .execute(CompletePayment {
                transaction_id: payment::Id::new(),
                external_ref: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), E::TransactionNotExists(_)));
    }
}
