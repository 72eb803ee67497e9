//! Abstractions for offset pagination.

/// Default number of items on a [`Page`].
pub const DEFAULT_LIMIT: usize = 20;

/// Maximum number of items on a [`Page`].
pub const MAX_LIMIT: usize = 50;

/// A page of items.
#[derive(Clone, Debug)]
pub struct Page<I> {
    /// Items on this [`Page`].
    pub items: Vec<I>,

    /// Total number of items matching the [`Selector`], across all pages.
    pub total: usize,

    /// [`Arguments`] this [`Page`] was selected with.
    pub arguments: Arguments,
}

impl<I> Page<I> {
    /// Creates a new [`Page`] from the provided items.
    #[must_use]
    pub fn new(
        arguments: Arguments,
        items: impl IntoIterator<Item = impl Into<I>>,
        total: usize,
    ) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            total,
            arguments,
        }
    }

    /// Indicates whether there are more items after this [`Page`].
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.arguments.offset + self.items.len() < self.total
    }

    /// Maps items of this [`Page`].
    #[must_use]
    pub fn map<T>(self, f: impl FnMut(I) -> T) -> Page<T> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            arguments: self.arguments,
        }
    }
}

/// Pagination arguments.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Arguments {
    /// Number of items to return.
    pub limit: usize,

    /// Number of items to skip.
    pub offset: usize,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Arguments {
    /// Creates new [`Arguments`] out of the raw requested values.
    ///
    /// Missing or non-positive `limit` falls back to [`DEFAULT_LIMIT`] and is
    /// capped by [`MAX_LIMIT`]. Missing or negative `offset` is `0`.
    #[must_use]
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = limit
            .and_then(|l| usize::try_from(l).ok())
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);
        let offset = offset
            .and_then(|o| usize::try_from(o).ok())
            .unwrap_or_default();
        Self { limit, offset }
    }

    /// Returns the `LIMIT` of these [`Arguments`] suitable for SQL.
    #[must_use]
    pub fn sql_limit(&self) -> i64 {
        i64::try_from(self.limit).unwrap_or(i64::MAX)
    }

    /// Returns the `OFFSET` of these [`Arguments`] suitable for SQL.
    #[must_use]
    pub fn sql_offset(&self) -> i64 {
        i64::try_from(self.offset).unwrap_or(i64::MAX)
    }
}

/// Pagination selector.
#[derive(Clone, Copy, Debug)]
pub struct Selector<F> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments,

    /// Additional filter being applied to the result.
    pub filter: F,
}

/// Order of items.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Order {
    /// Ascending order.
    Ascending,

    /// Descending order.
    Descending,
}

impl Order {
    #[cfg(feature = "postgres")]
    /// Returns SQL keyword representing this [`Order`].
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($node:ty, $filter:ty) => {
        #[doc = "A [`Page`] of nodes."]
        pub type Page = $crate::pagination::Page<$node>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$filter>;
    };
}

#[cfg(test)]
mod spec {
    use super::{Arguments, Page, DEFAULT_LIMIT, MAX_LIMIT};

    #[test]
    fn defaults_limit() {
        assert_eq!(Arguments::new(None, None), Arguments::default());
        assert_eq!(Arguments::new(Some(0), None).limit, DEFAULT_LIMIT);
        assert_eq!(Arguments::new(Some(-3), None).limit, DEFAULT_LIMIT);
    }

    #[test]
    fn caps_limit() {
        assert_eq!(Arguments::new(Some(10), None).limit, 10);
        assert_eq!(Arguments::new(Some(50), None).limit, MAX_LIMIT);
        assert_eq!(Arguments::new(Some(1000), None).limit, MAX_LIMIT);
    }

    #[test]
    fn clamps_offset() {
        assert_eq!(Arguments::new(None, Some(40)).offset, 40);
        assert_eq!(Arguments::new(None, Some(-1)).offset, 0);
    }

    #[test]
    fn detects_more_items() {
        let args = Arguments::new(Some(2), Some(2));

        assert!(Page::<u8>::new(args, [1, 2], 5).has_more());
        assert!(!Page::<u8>::new(args, [1, 2], 4).has_more());
    }

    #[test]
    fn maps_items() {
        let page = Page::<u8>::new(Arguments::default(), [1, 2], 2)
            .map(|i| i.to_string());

        assert_eq!(page.items, ["1", "2"]);
        assert_eq!(page.total, 2);
    }
}
