//! [`Query`] collection related to payment [`Transaction`]s.

use common::operations::By;

use crate::{
    domain::{payment, Transaction},
    read,
};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a payment [`Transaction`] by its [`payment::Id`].
pub type ById = DatabaseQuery<By<Option<Transaction>, payment::Id>>;

/// Queries all payment [`Transaction`]s of one resident, newest first.
pub type ForResident =
    DatabaseQuery<By<Vec<Transaction>, read::payment::ForResident>>;
