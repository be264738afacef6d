//! [`Query`] collection related to fee [`Category`]s.

use common::operations::By;

use crate::{
    domain::{fee, Category},
    read,
};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a fee [`Category`] by its [`fee::Id`].
pub type ById = DatabaseQuery<By<Option<Category>, fee::Id>>;

/// Queries fee [`Category`]s matching a [`read::fee::list::Filter`].
pub type List = DatabaseQuery<By<Vec<Category>, read::fee::list::Filter>>;
