//! Fee [`Category`] read model definitions.

#[cfg(doc)]
use crate::domain::Category;

pub mod list {
    //! Fee [`Category`] list definitions.

    use crate::domain::user;
    #[cfg(doc)]
    use crate::domain::Category;

    /// Filter for selecting fee [`Category`]s.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// Restricts to active (payable) or inactive (locked) [`Category`]s.
        pub active: Option<bool>,

        /// Restricts to [`Category`]s addressed to the provided resident,
        /// including broadcast ones.
        pub resident_id: Option<user::Id>,
    }
}
