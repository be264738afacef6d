//! Fee [`Category`]-related REST API definitions.
//!
//! [`Category`]: service::domain::Category

use axum::{
    extract::{Path, Query},
    Json,
};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, fee, user},
    query::{self, payable, Query as _},
    read,
};

use crate::{AsError, Context, Error};

/// Fee [`Category`] representation of the REST API.
///
/// [`Category`]: domain::Category
#[derive(Debug, Serialize)]
pub struct Category {
    /// ID of the category.
    pub id: fee::Id,

    /// Human-readable name.
    pub name: String,

    /// Net amount in `{amount}{CUR}` form.
    pub amount: String,

    /// Tax percentage applied on top of the net amount.
    pub tax_percentage: String,

    /// Billing frequency.
    pub frequency: fee::Frequency,

    /// Kind of the charge.
    pub category_type: fee::Kind,

    /// Days before the charge is overdue.
    pub grace_period: u16,

    /// Indicator whether the category recurs.
    pub is_recurring: bool,

    /// Indicator whether the category is payable.
    pub active: bool,

    /// Addressee of the category, if not broadcast.
    pub resident: Option<user::Id>,

    /// Free-form description, if any.
    pub description: Option<String>,

    /// Gross amount (net plus tax) in `{amount}{CUR}` form.
    pub total_amount: String,

    /// RFC 3339 creation timestamp.
    pub created_date: String,
}

impl From<domain::Category> for Category {
    fn from(category: domain::Category) -> Self {
        Self {
            id: category.id,
            name: category.name.to_string(),
            amount: category.amount.to_string(),
            tax_percentage: category.tax.to_string(),
            frequency: category.frequency,
            category_type: category.kind,
            grace_period: category.grace_period.into(),
            is_recurring: category.is_recurring,
            active: category.active,
            resident: category.resident_id,
            description: category.description.as_ref().map(ToString::to_string),
            total_amount: category.gross().to_string(),
            created_date: category.created_at.coerce::<()>().to_rfc3339(),
        }
    }
}

/// Input of the [`create()`] endpoint.
#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    /// Human-readable name.
    pub name: String,

    /// Net amount in `{amount}{CUR}` form.
    pub amount: String,

    /// Tax percentage applied on top of the net amount.
    pub tax_percentage: String,

    /// Billing frequency.
    pub frequency: fee::Frequency,

    /// Kind of the charge.
    pub category_type: fee::Kind,

    /// Days before the charge is overdue.
    #[serde(default)]
    pub grace_period: u16,

    /// Indicator whether the category recurs.
    #[serde(default)]
    pub is_recurring: bool,

    /// Addressee of the category, if not broadcast.
    #[serde(default)]
    pub resident: Option<user::Id>,

    /// Free-form description, if any.
    #[serde(default)]
    pub description: Option<String>,
}

/// Parameters of the [`list()`] endpoint.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Restricts to active (payable) or locked categories.
    #[serde(default)]
    pub active: Option<bool>,
}

/// `GET /paymentcategories/?active=`: lists fee categories.
///
/// Residents receive only active categories addressed to them (or broadcast);
/// staff see everything, optionally filtered by the `active` flag.
///
/// # Errors
///
/// If the request is not authenticated.
pub async fn list(
    ctx: Context,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Category>>, Error> {
    let session = ctx.current_session().await?;

    let filter = match session.role {
        // Locked categories are invisible to residents.
        user::Role::Resident => read::fee::list::Filter {
            active: Some(true),
            resident_id: Some(session.user_id),
        },
        user::Role::Admin | user::Role::Management => read::fee::list::Filter {
            active: params.active,
            resident_id: None,
        },
    };

    let categories = ctx
        .service()
        .execute(query::fee::List::by(filter))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// `POST /paymentcategories/`: creates a new fee category.
///
/// # Errors
///
/// If the actor is not an administrator, or the input is invalid.
pub async fn create(
    ctx: Context,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>, Error> {
    let _session = ctx.current_admin_session().await?;

    let category = ctx
        .service()
        .execute(command::CreateFeeCategory {
            name: fee::Name::new(input.name)
                .ok_or_else(|| Error::validation(&"invalid `name`"))?,
            amount: input
                .amount
                .parse()
                .map_err(|_| Error::validation(&"invalid `amount`"))?,
            tax: input
                .tax_percentage
                .parse()
                .map_err(|_| Error::validation(&"invalid `tax_percentage`"))?,
            frequency: input.frequency,
            kind: input.category_type,
            grace_period: input.grace_period.into(),
            is_recurring: input.is_recurring,
            resident_id: input.resident,
            description: input
                .description
                .map(|d| {
                    fee::Description::new(d).ok_or_else(|| {
                        Error::validation(&"invalid `description`")
                    })
                })
                .transpose()?,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(category.into()))
}

/// Input of the [`update()`] endpoint.
///
/// Absent fields are left unchanged; `active` locks or unlocks the category.
#[derive(Debug, Deserialize)]
pub struct CategoryPatch {
    /// New human-readable name.
    #[serde(default)]
    pub name: Option<String>,

    /// New net amount in `{amount}{CUR}` form.
    #[serde(default)]
    pub amount: Option<String>,

    /// New tax percentage.
    #[serde(default)]
    pub tax_percentage: Option<String>,

    /// New billing frequency.
    #[serde(default)]
    pub frequency: Option<fee::Frequency>,

    /// New kind of the charge.
    #[serde(default)]
    pub category_type: Option<fee::Kind>,

    /// New grace period.
    #[serde(default)]
    pub grace_period: Option<u16>,

    /// New recurrence indicator.
    #[serde(default)]
    pub is_recurring: Option<bool>,

    /// New free-form description.
    #[serde(default)]
    pub description: Option<String>,

    /// Locks (`false`) or unlocks (`true`) the category.
    #[serde(default)]
    pub active: Option<bool>,
}

/// `PATCH /paymentcategories/{id}/`: edits a fee category and/or flips its
/// lock.
///
/// # Errors
///
/// If the actor is not an administrator, the category does not exist, or the
/// input is invalid.
pub async fn update(
    ctx: Context,
    Path(id): Path<fee::Id>,
    Json(patch): Json<CategoryPatch>,
) -> Result<Json<Category>, Error> {
    let _session = ctx.current_admin_session().await?;

    let current = ctx
        .service()
        .execute(query::fee::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::not_found(&format!("unknown category {id}")))?;

    let edits_fields = patch.name.is_some()
        || patch.amount.is_some()
        || patch.tax_percentage.is_some()
        || patch.frequency.is_some()
        || patch.category_type.is_some()
        || patch.grace_period.is_some()
        || patch.is_recurring.is_some()
        || patch.description.is_some();

    let mut category = current;
    if edits_fields {
        category = ctx
            .service()
            .execute(command::UpdateFeeCategory {
                category_id: id,
                name: patch
                    .name
                    .map(|n| {
                        fee::Name::new(n).ok_or_else(|| {
                            Error::validation(&"invalid `name`")
                        })
                    })
                    .transpose()?
                    .unwrap_or(category.name),
                amount: patch
                    .amount
                    .map(|a| {
                        a.parse().map_err(|_| {
                            Error::validation(&"invalid `amount`")
                        })
                    })
                    .transpose()?
                    .unwrap_or(category.amount),
                tax: patch
                    .tax_percentage
                    .map(|t| {
                        t.parse().map_err(|_| {
                            Error::validation(&"invalid `tax_percentage`")
                        })
                    })
                    .transpose()?
                    .unwrap_or(category.tax),
                frequency: patch.frequency.unwrap_or(category.frequency),
                kind: patch.category_type.unwrap_or(category.kind),
                grace_period: patch
                    .grace_period
                    .map_or(category.grace_period, Into::into),
                is_recurring: patch
                    .is_recurring
                    .unwrap_or(category.is_recurring),
                resident_id: category.resident_id,
                description: patch
                    .description
                    .map(|d| {
                        fee::Description::new(d).ok_or_else(|| {
                            Error::validation(&"invalid `description`")
                        })
                    })
                    .transpose()?
                    .or(category.description),
            })
            .await
            .map_err(AsError::into_error)?;
    }

    if let Some(active) = patch.active {
        category = ctx
            .service()
            .execute(command::SetFeeCategoryActive {
                category_id: id,
                active,
            })
            .await
            .map_err(AsError::into_error)?;
    }

    Ok(Json(category.into()))
}

/// Payable state of one category, as rendered to a resident.
#[derive(Debug, Serialize)]
pub struct Payable {
    /// The category itself.
    pub category: Category,

    /// Indicator whether the category is settled for the current period.
    pub paid: bool,
}

/// `GET /paymentcategories/payable/`: active categories of the authenticated
/// resident, each with its gross amount and paid state.
///
/// # Errors
///
/// If the request is not authenticated.
pub async fn payable(ctx: Context) -> Result<Json<Vec<Payable>>, Error> {
    let session = ctx.current_session().await?;

    let payables = ctx
        .service()
        .execute(payable::PayableCategories {
            resident_id: session.user_id,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(
        payables
            .into_iter()
            .map(|p| Payable {
                category: p.category.into(),
                paid: p.paid,
            })
            .collect(),
    ))
}

impl AsError for command::create_fee_category::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::create_fee_category::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::NegativeAmount(_) => Some(Error::validation(&self)),
        }
    }
}

impl AsError for command::update_fee_category::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::update_fee_category::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::CategoryNotExists(_) => Some(Error::not_found(&self)),
            E::NegativeAmount(_) => Some(Error::validation(&self)),
        }
    }
}

impl AsError for command::set_fee_category_active::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::set_fee_category_active::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::CategoryNotExists(_) => Some(Error::not_found(&self)),
        }
    }
}
