//! [`Query`] collection related to [`Amenity`]s.

use common::operations::By;

use crate::domain::{amenity, Amenity};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries an [`Amenity`] by its [`amenity::Id`].
pub type ById = DatabaseQuery<By<Option<Amenity>, amenity::Id>>;

/// Queries all [`Amenity`]s.
pub type All = DatabaseQuery<By<Vec<Amenity>, ()>>;
