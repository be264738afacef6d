//! [`Query`] collection related to [`Booking`]s.

use std::collections::HashMap;

use common::operations::By;

use crate::{
    domain::{booking, Booking},
    read,
};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Booking`] by its [`booking::Id`].
pub type ById = DatabaseQuery<By<Option<Booking>, booking::Id>>;

/// Queries a [`read::booking::list::Page`] of [`Booking`]s, keyset-ordered by
/// `(usage_date, id)` ascending.
pub type List =
    DatabaseQuery<By<read::booking::list::Page, read::booking::list::Selector>>;

/// Queries [`Booking`]s of a page in their bulk form.
pub type ByIds =
    DatabaseQuery<By<HashMap<booking::Id, Booking>, Vec<booking::Id>>>;
