//! [`Command`] for locking or unlocking a fee [`Category`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{fee, Category},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for activating or deactivating a fee [`Category`].
///
/// A deactivated [`Category`] is locked: residents can neither view nor pay
/// it until an administrator unlocks it again.
#[derive(Clone, Copy, Debug)]
pub struct SetFeeCategoryActive {
    /// ID of the [`Category`] to lock or unlock.
    pub category_id: fee::Id,

    /// Whether the [`Category`] should be payable.
    pub active: bool,
}

impl<Db> Command<SetFeeCategoryActive> for Service<Db>
where
    Db: Database<
            Select<By<Option<Category>, fee::Id>>,
            Ok = Option<Category>,
            Err = Traced<database::Error>,
        > + Database<Update<Category>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Category;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SetFeeCategoryActive,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SetFeeCategoryActive {
            category_id,
            active,
        } = cmd;

        let mut category = self
            .database()
            .execute(Select(By::<Option<Category>, _>::new(category_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CategoryNotExists(category_id))
            .map_err(tracerr::wrap!())?;

        category.active = active;
        self.database()
            .execute(Update(category.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(category)
    }
}

/// Error of [`SetFeeCategoryActive`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Category`] with the provided ID does not exist.
    #[display("`Category(id: {_0})` does not exist")]
    CategoryNotExists(#[error(not(source))] fee::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
