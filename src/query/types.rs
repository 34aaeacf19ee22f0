use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::num::{i32_to_usize, usize_checked_mul};

pub const DEFAULT_PAGE: i32 = 1;
pub const DEFAULT_PAGE_SIZE: i32 = 10;
pub const DEFAULT_MAX_PAGE_SIZE: i32 = 100;

/// Paging, sorting and filtering inputs for one list query.
///
/// Field names on the wire follow the API's query-string binding
/// (`page`, `pageSize`, `maxPageSize`, `sortField`, `sortDesc`, `filter`,
/// `filterField`, `filterValue`). Missing fields take their defaults. An
/// absent `pageSize` stays `None` so a server config can supply its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryParams {
    pub page: i32,
    pub page_size: Option<i32>,
    pub max_page_size: i32,
    pub sort_field: Option<String>,
    pub sort_desc: bool,
    pub filter: Option<String>,
    pub filter_field: Option<String>,
    pub filter_value: Option<String>,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: None,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            sort_field: None,
            sort_desc: false,
            filter: None,
            filter_field: None,
            filter_value: None,
        }
    }
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_page(mut self, page: i32, page_size: i32) -> Self {
        self.page = page;
        self.page_size = Some(page_size);
        self
    }

    #[must_use]
    pub const fn with_max_page_size(mut self, max_page_size: i32) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, field: impl Into<String>, desc: bool) -> Self {
        self.sort_field = Some(field.into());
        self.sort_desc = desc;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_simple_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter_field = Some(field.into());
        self.filter_value = Some(value.into());
        self
    }

    /// Page number used for the skip computation; anything below 1 is page 1.
    #[must_use]
    pub const fn effective_page(&self) -> i32 {
        if self.page < 1 { 1 } else { self.page }
    }

    /// `clamp(page_size, 1, max(1, max_page_size))`, with [`DEFAULT_PAGE_SIZE`]
    /// standing in for an absent size.
    #[must_use]
    pub fn effective_page_size(&self) -> usize {
        let ceiling = self.max_page_size.max(1);
        let size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).min(ceiling).max(1);
        i32_to_usize(size).unwrap_or(1)
    }

    /// Number of records before the requested page. Saturates instead of overflowing.
    #[must_use]
    pub fn skip(&self) -> usize {
        let prior_pages = i32_to_usize(self.effective_page() - 1).unwrap_or(0);
        usize_checked_mul(prior_pages, self.effective_page_size()).unwrap_or(usize::MAX)
    }

    /// The DSL filter, if one was supplied and is not blank.
    #[must_use]
    pub fn filter_expr(&self) -> Option<&str> {
        non_blank(self.filter.as_deref())
    }

    /// The simple field/value pair, only when both halves are present.
    #[must_use]
    pub fn simple_filter(&self) -> Option<(&str, &str)> {
        Some((non_blank(self.filter_field.as_deref())?, non_blank(self.filter_value.as_deref())?))
    }

    #[must_use]
    pub fn sort_spec(&self) -> Option<SortSpec> {
        non_blank(self.sort_field.as_deref()).map(|field| SortSpec {
            field: field.trim().to_string(),
            order: if self.sort_desc { Order::Desc } else { Order::Asc },
        })
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}

/// One page of projected results plus the unpaged match count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_count: usize,
    pub page: i32,
    pub page_size: usize,
}

impl<T> PagedResult<T> {
    #[must_use]
    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 { 0 } else { self.total_count.div_ceil(self.page_size) }
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        let page = i32_to_usize(self.page.max(1)).unwrap_or(1);
        page < self.total_pages()
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Re-project the items, keeping the paging metadata.
    pub fn map<R>(self, f: impl FnMut(T) -> R) -> PagedResult<R> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: Order,
}

/// Operators of the filter DSL. `=` and `==` both parse to [`CmpOp::Eq`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
}

impl CmpOp {
    // Longer tokens first so `>=` wins over `>` at the same position.
    pub(crate) const TOKENS: [(&'static str, Self); 8] = [
        ("==", Self::Eq),
        ("!=", Self::Ne),
        (">=", Self::Gte),
        ("<=", Self::Lte),
        ("=", Self::Eq),
        (">", Self::Gt),
        ("<", Self::Lt),
        (":", Self::Contains),
    ];

    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Contains => ":",
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// `fieldPath operator value`, as written in the filter string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub path: String,
    pub op: CmpOp,
    pub value: String,
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.path, self.op, self.value)
    }
}

/// Syntax-level result of parsing a filter string: OR of AND-groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFilter {
    pub groups: Vec<Vec<Term>>,
    /// Raw terms rejected by the parser (no operator, malformed path).
    pub rejected: Vec<String>,
}

/// Why a term contributed no condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Syntax,
    UnknownField,
    UnsupportedOperator,
    InvalidLiteral,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedTerm {
    pub term: String,
    pub reason: DropReason,
}
