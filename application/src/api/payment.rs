//! Payment [`Transaction`]-related REST API definitions.
//!
//! [`Transaction`]: service::domain::Transaction

use axum::{extract::Path, Json};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, fee, payment, user},
    query::{self, Query as _},
    read,
};

use crate::{AsError, Context, Error};

/// Payment [`Transaction`] representation of the REST API.
///
/// [`Transaction`]: domain::Transaction
#[derive(Debug, Serialize)]
pub struct Transaction {
    /// ID of the transaction.
    pub id: payment::Id,

    /// ID of the fee category being settled.
    pub category: fee::Id,

    /// ID of the paying resident.
    pub resident: user::Id,

    /// Charged amount in `{amount}{CUR}` form.
    pub amount: String,

    /// Payment method.
    pub method: payment::Method,

    /// Status of the transaction.
    pub status: payment::Status,

    /// Reference assigned by the external gateway, if any.
    pub transaction_id: Option<String>,

    /// RFC 3339 settlement timestamp, if settled.
    pub paid_date: Option<String>,

    /// RFC 3339 creation timestamp.
    pub created_date: String,
}

impl From<domain::Transaction> for Transaction {
    fn from(transaction: domain::Transaction) -> Self {
        Self {
            id: transaction.id,
            category: transaction.category_id,
            resident: transaction.resident_id,
            amount: transaction.amount.to_string(),
            method: transaction.method,
            status: transaction.status,
            transaction_id: transaction
                .external_ref
                .map(|r| r.to_string()),
            paid_date: transaction
                .paid_at
                .map(|at| at.coerce::<()>().to_rfc3339()),
            created_date: transaction.created_at.coerce::<()>().to_rfc3339(),
        }
    }
}

/// `GET /paymenttransactions/my-payments/`: every transaction of the
/// authenticated resident, newest first.
///
/// # Errors
///
/// If the request is not authenticated.
pub async fn my_payments(ctx: Context) -> Result<Json<Vec<Transaction>>, Error> {
    let session = ctx.current_session().await?;

    let transactions = ctx
        .service()
        .execute(query::payment::ForResident::by(
            read::payment::ForResident {
                resident_id: session.user_id,
            },
        ))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}

/// Output of the [`create_vnpay()`] endpoint.
#[derive(Debug, Serialize)]
pub struct InitiationResponse {
    /// Gateway URL to settle the transaction through.
    pub payment_url: String,

    /// Charged amount in `{amount}{CUR}` form.
    pub amount: String,

    /// ID of the created PENDING transaction.
    pub transaction_id: payment::Id,
}

/// `POST /paymenttransactions/{categoryId}/create-vnpay-payment/`: initiates
/// a VNPay payment of a fee category.
///
/// # Errors
///
/// If the request is not authenticated, or the category is missing or locked.
pub async fn create_vnpay(
    ctx: Context,
    Path(category_id): Path<fee::Id>,
) -> Result<Json<InitiationResponse>, Error> {
    let session = ctx.current_session().await?;

    let output = ctx
        .service()
        .execute(command::InitiatePayment {
            category_id,
            resident_id: session.user_id,
            method: payment::Method::Vnpay,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(InitiationResponse {
        payment_url: output.payment_url.to_string(),
        amount: output.transaction.amount.to_string(),
        transaction_id: output.transaction.id,
    }))
}

/// Input of the [`update_payment()`] endpoint.
#[derive(Debug, Deserialize)]
pub struct UpdatePaymentInput {
    /// Status to transition the transaction into.
    pub status: payment::Status,

    /// Reference reported by the external gateway, if any.
    #[serde(default)]
    pub transaction_id: Option<String>,
}

/// `PATCH /paymenttransactions/{id}/update-payment/`: administrative status
/// override, routed through the same guarded transitions the gateway callback
/// uses.
///
/// # Errors
///
/// If the actor is not an administrator, the transaction does not exist, or
/// the transition violates the status workflow.
pub async fn update_payment(
    ctx: Context,
    Path(id): Path<payment::Id>,
    Json(input): Json<UpdatePaymentInput>,
) -> Result<Json<Transaction>, Error> {
    let _session = ctx.current_admin_session().await?;

    let external_ref = input
        .transaction_id
        .map(|r| {
            payment::ExternalRef::new(r).ok_or_else(|| {
                Error::validation(&"invalid `transaction_id`")
            })
        })
        .transpose()?;

    let transaction = match input.status {
        payment::Status::Completed => ctx
            .service()
            .execute(command::CompletePayment {
                transaction_id: id,
                external_ref,
            })
            .await
            .map_err(AsError::into_error)?,
        payment::Status::Failed => ctx
            .service()
            .execute(command::FailPayment {
                transaction_id: id,
                external_ref,
            })
            .await
            .map_err(AsError::into_error)?,
        payment::Status::Refunded => ctx
            .service()
            .execute(command::RefundPayment { transaction_id: id })
            .await
            .map_err(AsError::into_error)?,
        payment::Status::Pending => {
            return Err(Error::invalid_transition(
                &"a transaction cannot be reset to PENDING",
            ));
        }
    };

    Ok(Json(transaction.into()))
}

impl AsError for command::initiate_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::initiate_payment::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            // A locked category is indistinguishable from a missing one.
            E::CategoryLocked(_) | E::CategoryNotExists(_) => {
                Some(Error::not_found(&self))
            }
        }
    }
}

impl AsError for command::complete_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::complete_payment::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::InvalidTransition { .. } => {
                Some(Error::invalid_transition(&self))
            }
            E::TransactionNotExists(_) => Some(Error::not_found(&self)),
        }
    }
}

impl AsError for command::fail_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::fail_payment::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::InvalidTransition { .. } => {
                Some(Error::invalid_transition(&self))
            }
            E::TransactionNotExists(_) => Some(Error::not_found(&self)),
        }
    }
}

impl AsError for command::refund_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::refund_payment::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::InvalidTransition { .. } => {
                Some(Error::invalid_transition(&self))
            }
            E::TransactionNotExists(_) => Some(Error::not_found(&self)),
        }
    }
}
