//! List query normalization
//!
//! Turns raw pagination (`limit`/`offset` or `page`/`size`) and sort
//! (`sort_by`/`sort_order`) parameters into a [`ListQuery`]. Sort fields are
//! passed through untouched here; [`OrderBy::resolve`] is the only place a
//! field name is checked against a resource's allow-list.

use crate::resource::Resource;
use serde::Deserialize;
use std::fmt;

/// Upper bound on the number of records a single page may hold
pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw list parameters as they arrive on the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Limit/offset window. A non-positive limit means "no pagination".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// Normalize raw pagination parameters.
    ///
    /// `page`/`size` take precedence over `limit`/`offset` when both parse as
    /// positive integers. Values that do not parse are treated as absent.
    pub fn from_params(
        limit: Option<&str>,
        offset: Option<&str>,
        page: Option<&str>,
        size: Option<&str>,
    ) -> Self {
        let mut pagination = Self::default();

        if let Some(limit) = parse_int(limit).filter(|l| *l > 0) {
            pagination.limit = limit.min(MAX_PAGE_SIZE);
        }
        if let Some(offset) = parse_int(offset).filter(|o| *o >= 0) {
            pagination.offset = offset;
        }

        let page = parse_int(page).filter(|p| *p > 0);
        let size = parse_int(size).filter(|s| *s > 0);
        if let (Some(page), Some(size)) = (page, size) {
            let size = size.min(MAX_PAGE_SIZE);
            pagination.limit = size;
            pagination.offset = (page - 1).saturating_mul(size);
        }

        pagination
    }

    pub fn is_unbounded(&self) -> bool {
        self.limit <= 0
    }

    /// Slice bounds for a collection of `len` records
    pub fn window(&self, len: usize) -> std::ops::Range<usize> {
        if self.is_unbounded() {
            return 0..len;
        }
        let start = usize::try_from(self.offset.max(0)).unwrap_or(usize::MAX);
        if start >= len {
            return len..len;
        }
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        start..start.saturating_add(limit).min(len)
    }
}

fn parse_int(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than `desc` means ascending
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

/// Caller-requested ordering, not yet checked against any allow-list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sort {
    pub field: Option<String>,
    pub order: SortOrder,
}

impl Sort {
    pub fn from_params(sort_by: Option<&str>, sort_order: Option<&str>) -> Self {
        Self {
            field: sort_by.filter(|f| !f.is_empty()).map(str::to_string),
            order: SortOrder::parse(sort_order),
        }
    }

    pub fn by(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: Some(field.into()),
            order,
        }
    }
}

/// Ordering resolved against a resource's allow-list.
///
/// `field` always points into [`Resource::SORT_FIELDS`] or is `created_at`,
/// so it is safe to format into a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: &'static str,
    pub order: SortOrder,
}

impl OrderBy {
    /// Newest first
    pub const DEFAULT: OrderBy = OrderBy {
        field: "created_at",
        order: SortOrder::Desc,
    };

    pub fn resolve<R: Resource>(sort: &Sort) -> Self {
        let Some(requested) = sort.field.as_deref() else {
            return Self::DEFAULT;
        };
        match R::SORT_FIELDS.iter().copied().find(|f| *f == requested) {
            Some(field) => OrderBy {
                field,
                order: sort.order,
            },
            None => Self::DEFAULT,
        }
    }
}

/// Everything a backend needs to answer a list request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub pagination: Pagination,
    pub sort: Sort,
}

impl ListQuery {
    /// The whole collection in default order
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(limit: i64, offset: i64, sort_by: &str, sort_order: &str) -> Self {
        Self {
            pagination: Pagination::new(limit, offset),
            sort: Sort::from_params(Some(sort_by), Some(sort_order)),
        }
    }
}

impl From<&ListParams> for ListQuery {
    fn from(params: &ListParams) -> Self {
        Self {
            pagination: Pagination::from_params(
                params.limit.as_deref(),
                params.offset.as_deref(),
                params.page.as_deref(),
                params.size.as_deref(),
            ),
            sort: Sort::from_params(params.sort_by.as_deref(), params.sort_order.as_deref()),
        }
    }
}
