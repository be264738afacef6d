//! [`ExpirePendingPayments`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Perform, Start, Update};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{payment, Transaction},
    infra::{database, Database},
    Service,
};

use super::Task;

/// Configuration for [`ExpirePendingPayments`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between expiration sweeps.
    pub interval: time::Duration,

    /// Timeout after which a PENDING [`Transaction`] is considered abandoned.
    pub timeout: time::Duration,
}

/// [`Task`] failing PENDING [`Transaction`]s whose gateway redirect was
/// abandoned.
///
/// A resident navigating away from the gateway never produces a callback, so
/// the PENDING record would otherwise dangle forever.
#[derive(Clone, Copy, Debug)]
pub struct ExpirePendingPayments<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<ExpirePendingPayments<Self>, Config>>> for Service<Db>
where
    ExpirePendingPayments<Service<Db>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<ExpirePendingPayments<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = ExpirePendingPayments {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::ExpirePendingPayments` failed: {e}");
            });
        }
    }
}

impl<Db> Task<Perform<()>> for ExpirePendingPayments<Service<Db>>
where
    Db: Database<
        Update<By<Transaction, payment::CreationDateTime>>,
        Ok = u64,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let deadline = payment::CreationDateTime::now() - self.config.timeout;
        let expired = self
            .service
            .database()
            .execute(Update(By::new(deadline)))
            .await
            .map_err(tracerr::map_from_and_wrap!())?;
        if expired > 0 {
            log::info!("failed {expired} abandoned PENDING transaction(s)");
        }
        Ok(())
    }
}

/// Error of [`ExpirePendingPayments`] execution.
pub type ExecutionError = Traced<database::Error>;
