//! Abstractions for forward keyset pagination.

/// Generic pagination connection.
#[derive(Clone, Debug)]
pub struct Connection<C, I> {
    /// [`Edge`]s in this [`Connection`].
    pub edges: Vec<Edge<C, I>>,

    /// Indicator whether this [`Connection`] has more nodes.
    pub has_more: bool,
}

/// A page in a [`Connection`].
pub type Page<C, I> = Connection<C, I>;

impl<C, I> Connection<C, I> {
    /// Creates a new [`Connection`] from the provided [`Edge`]s.
    #[must_use]
    pub fn new(
        edges: impl IntoIterator<Item = impl Into<Edge<C, I>>>,
        has_more: bool,
    ) -> Self {
        Self {
            edges: edges.into_iter().map(Into::into).collect::<Vec<_>>(),
            has_more,
        }
    }

    /// Returns [`PageInfo`] of this [`Connection`].
    #[must_use]
    pub fn page_info(&self) -> PageInfo<C>
    where
        C: Clone,
    {
        PageInfo {
            end_cursor: self.edges.last().map(|e| e.cursor.clone()),
            has_next_page: self.has_more,
        }
    }
}

/// Information about a page in a [`Connection`].
#[derive(Clone, Copy, Debug)]
pub struct PageInfo<C> {
    /// Last cursor on this page.
    pub end_cursor: Option<C>,

    /// Indicator whether [`Connection`] has a next page.
    pub has_next_page: bool,
}

/// An edge in a [`Connection`].
#[derive(Clone, Copy, Debug)]
pub struct Edge<C, I> {
    /// Cursor of this [`Edge`].
    pub cursor: C,

    /// Node of this [`Edge`].
    pub node: I,
}

impl<C, I> From<(C, I)> for Edge<C, I> {
    fn from((cursor, node): (C, I)) -> Self {
        Self { cursor, node }
    }
}

/// Pagination arguments.
///
/// Pagination is forward-only: a page of `first` items following the `after`
/// cursor (or the very beginning). Re-issuing the request with the last
/// returned cursor restarts the sequence exactly where it stopped.
#[derive(Clone, Copy, Debug)]
pub struct Arguments<C> {
    /// Number of items to return.
    first: usize,

    /// Cursor after which to return items.
    after: Option<C>,
}

impl<C> Arguments<C> {
    /// Creates a new [`Arguments`].
    ///
    /// [`None`] is returned if the provided `first` cannot be represented as
    /// a [`usize`].
    pub fn new<Num>(
        first: Option<Num>,
        after: Option<C>,
        default: Num,
    ) -> Option<Self>
    where
        Num: TryInto<usize>,
    {
        Some(Self {
            first: first.unwrap_or(default).try_into().ok()?,
            after,
        })
    }

    /// Returns cursor requested by this [`Arguments`].
    #[must_use]
    pub fn cursor(&self) -> Option<&C> {
        self.after.as_ref()
    }

    /// Returns limit requested by this [`Arguments`].
    #[must_use]
    pub fn limit(&self) -> usize {
        self.first
    }
}

/// Pagination selector.
#[derive(Clone, Copy, Debug)]
pub struct Selector<C, F> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments<C>,

    /// Additional filter being applied to the result.
    pub filter: F,
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($cursor:ty, $node:ty, $filter:ty) => {
        #[doc = "Edge of a [`Connection`]."]
        pub type Edge = $crate::pagination::Edge<$cursor, $node>;

        #[doc = "A [`Connection`] of [`$node`]s."]
        pub type Connection = $crate::pagination::Connection<$cursor, $node>;

        #[doc = "A [`Page`] of [`$node`]s."]
        pub type Page = $crate::pagination::Page<$cursor, $node>;

        #[doc = "An information about a [`Page`]."]
        pub type PageInfo = $crate::pagination::PageInfo<$cursor>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments<$cursor>;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$cursor, $filter>;
    };
}

#[cfg(test)]
mod spec {
    use super::{Arguments, Connection, Edge};

    #[test]
    fn falls_back_to_the_default_limit() {
        let args = Arguments::<u32>::new(None, None, 50_i32).unwrap();
        assert_eq!(args.limit(), 50);
        assert!(args.cursor().is_none());

        let args = Arguments::new(Some(10_i32), Some(7_u32), 50_i32).unwrap();
        assert_eq!(args.limit(), 10);
        assert_eq!(args.cursor(), Some(&7));

        assert!(Arguments::<u32>::new(Some(-1_i32), None, 50_i32).is_none());
    }

    #[test]
    fn page_info_reports_the_last_cursor() {
        let page =
            Connection::<u32, &str>::new([(1, "a"), (2, "b")], true);
        let info = page.page_info();
        assert_eq!(info.end_cursor, Some(2));
        assert!(info.has_next_page);

        let empty_edges: [Edge<u32, &str>; 0] = [];
        let empty = Connection::<u32, &str>::new(empty_edges, false);
        assert!(empty.page_info().end_cursor.is_none());
        assert!(!empty.page_info().has_next_page);
    }
}
