use log::warn;
use std::borrow::Borrow;
use std::convert::Infallible;
use std::fmt;

use crate::config::FilterMode;
use crate::errors::QueryError;
use crate::shape::{Record, RecordShape};

use super::eval::{CompiledFilter, Predicate, compile_filter, compile_simple_filter};
use super::page::paginate;
use super::sort::SortKey;
use super::types::{DropReason, DroppedTerm, Order, PagedResult, QueryParams, SortSpec};

/// The external collaborator that supplies records.
///
/// Failures are returned to the caller of [`run_query`] unchanged.
pub trait RecordSource<T> {
    type Error;

    fn records(&self) -> Result<Vec<T>, Self::Error>;
}

impl<T: Clone> RecordSource<T> for [T] {
    type Error = Infallible;

    fn records(&self) -> Result<Vec<T>, Self::Error> {
        Ok(self.to_vec())
    }
}

impl<T: Clone> RecordSource<T> for Vec<T> {
    type Error = Infallible;

    fn records(&self) -> Result<Vec<T>, Self::Error> {
        Ok(self.clone())
    }
}

/// Adapts a loader closure into a [`RecordSource`].
pub struct FnSource<F>(pub F);

impl<T, E, F> RecordSource<T> for FnSource<F>
where
    F: Fn() -> Result<Vec<T>, E>,
{
    type Error = E;

    fn records(&self) -> Result<Vec<T>, Self::Error> {
        (self.0)()
    }
}

enum RecordFilter<T> {
    All,
    Expr(CompiledFilter<T>),
    Simple(Predicate<T>),
}

impl<T> RecordFilter<T> {
    fn matches(&self, record: &T) -> bool {
        match self {
            Self::All => true,
            Self::Expr(f) => f.matches(record),
            Self::Simple(p) => p(record),
        }
    }
}

/// [`QueryParams`] compiled against a record shape.
///
/// Holds no per-call state, so one compiled query can be run against any
/// number of sequences, from any thread.
pub struct Query<T> {
    filter: RecordFilter<T>,
    sort: Option<SortKey<T>>,
    params: QueryParams,
    dropped: Vec<DroppedTerm>,
}

impl<T> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filter = match &self.filter {
            RecordFilter::All => "all".to_string(),
            RecordFilter::Expr(c) => format!("{} group(s)", c.group_count()),
            RecordFilter::Simple(_) => "simple".to_string(),
        };
        f.debug_struct("Query")
            .field("filter", &filter)
            .field("sort", &self.sort)
            .field("params", &self.params)
            .field("dropped", &self.dropped)
            .finish()
    }
}

impl<T: Record> Query<T> {
    /// Compile with lenient filtering: unusable terms are dropped, never reported.
    #[must_use]
    pub fn compile(params: &QueryParams) -> Self {
        Self::compile_in(T::shape(), params)
    }

    /// Compile honoring `mode`. Only [`FilterMode::Strict`] can fail.
    pub fn compile_with_mode(params: &QueryParams, mode: FilterMode) -> Result<Self, QueryError> {
        Self::compile_in_with_mode(T::shape(), params, mode)
    }
}

impl<T: 'static> Query<T> {
    #[must_use]
    pub fn compile_in(shape: &RecordShape<T>, params: &QueryParams) -> Self {
        let mut dropped = Vec::new();
        let filter = if let Some(expr) = params.filter_expr() {
            let compiled = compile_filter(shape, expr);
            dropped.extend_from_slice(compiled.dropped());
            if compiled.is_noop() { RecordFilter::All } else { RecordFilter::Expr(compiled) }
        } else if let Some((field, value)) = params.simple_filter() {
            match compile_simple_filter(shape, field, value) {
                Ok(p) => RecordFilter::Simple(p),
                Err(reason) => {
                    dropped.push(DroppedTerm { term: format!("{field}={value}"), reason });
                    RecordFilter::All
                }
            }
        } else {
            RecordFilter::All
        };
        let sort = params.sort_spec().and_then(|spec| SortKey::bind(shape, &spec));
        Self { filter, sort, params: params.clone(), dropped }
    }

    pub fn compile_in_with_mode(
        shape: &RecordShape<T>,
        params: &QueryParams,
        mode: FilterMode,
    ) -> Result<Self, QueryError> {
        let query = Self::compile_in(shape, params);
        if mode == FilterMode::Strict {
            query.ensure_strict()?;
        }
        Ok(query)
    }

    fn ensure_strict(&self) -> Result<(), QueryError> {
        if let Some(d) = self.dropped.first() {
            warn!("rejecting filter term '{}': {:?}", d.term, d.reason);
            return Err(match d.reason {
                DropReason::Syntax => QueryError::Syntax(d.term.clone()),
                DropReason::UnknownField => QueryError::UnknownField(d.term.clone()),
                DropReason::UnsupportedOperator => QueryError::UnsupportedOperator(d.term.clone()),
                DropReason::InvalidLiteral => QueryError::InvalidLiteral(d.term.clone()),
            });
        }
        if let (Some(expr), RecordFilter::All) = (self.params.filter_expr(), &self.filter) {
            return Err(QueryError::EmptyFilter(expr.to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub const fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Terms (and simple-filter pairs) that produced no condition.
    #[must_use]
    pub fn dropped_terms(&self) -> &[DroppedTerm] {
        &self.dropped
    }

    /// True when filtering leaves every record in place.
    #[must_use]
    pub const fn is_unfiltered(&self) -> bool {
        matches!(self.filter, RecordFilter::All)
    }

    #[must_use]
    pub fn matches(&self, record: &T) -> bool {
        self.filter.matches(record)
    }

    pub fn filter<B, I>(&self, records: I) -> Vec<B>
    where
        B: Borrow<T>,
        I: IntoIterator<Item = B>,
    {
        records.into_iter().filter(|b| self.matches(b.borrow())).collect()
    }

    pub fn sort<B: Borrow<T>>(&self, records: Vec<B>) -> Vec<B> {
        match &self.sort {
            Some(key) => key.sort(records),
            None => records,
        }
    }

    /// Filter, sort, count, window and project, in that order.
    pub fn run<B, I, R, F>(&self, records: I, project: F) -> PagedResult<R>
    where
        B: Borrow<T>,
        I: IntoIterator<Item = B>,
        F: FnMut(B) -> R,
    {
        let sorted = self.sort(self.filter(records));
        paginate(sorted, &self.params, project)
    }
}

/// Keep the records admitted by `filter`, or by the simple field/value pair
/// when `filter` is absent. Order is preserved.
pub fn apply_filter<T, B, I>(
    records: I,
    filter: Option<&str>,
    filter_field: Option<&str>,
    filter_value: Option<&str>,
) -> Vec<B>
where
    T: Record,
    B: Borrow<T>,
    I: IntoIterator<Item = B>,
{
    let params = QueryParams {
        filter: filter.map(str::to_string),
        filter_field: filter_field.map(str::to_string),
        filter_value: filter_value.map(str::to_string),
        ..QueryParams::default()
    };
    Query::<T>::compile(&params).filter(records)
}

/// Order by a single top-level field; unknown or absent fields keep the input order.
pub fn apply_sorting<T, B>(records: Vec<B>, sort_field: Option<&str>, sort_desc: bool) -> Vec<B>
where
    T: Record,
    B: Borrow<T>,
{
    let Some(field) = sort_field.filter(|f| !f.trim().is_empty()) else {
        return records;
    };
    let spec = SortSpec {
        field: field.trim().to_string(),
        order: if sort_desc { Order::Desc } else { Order::Asc },
    };
    match SortKey::bind(T::shape(), &spec) {
        Some(key) => key.sort(records),
        None => records,
    }
}

/// Count, window and project an already filtered and sorted sequence.
pub fn apply_paging<I, B, R, F>(records: I, params: &QueryParams, project: F) -> PagedResult<R>
where
    I: IntoIterator<Item = B>,
    I::IntoIter: ExactSizeIterator,
    F: FnMut(B) -> R,
{
    paginate(records, params, project)
}

/// Load from `source`, then filter, sort and page with lenient filtering.
pub fn run_query<T, S, R, F>(
    source: &S,
    params: &QueryParams,
    project: F,
) -> Result<PagedResult<R>, S::Error>
where
    T: Record,
    S: RecordSource<T> + ?Sized,
    F: FnMut(T) -> R,
{
    let records = source.records()?;
    Ok(Query::<T>::compile(params).run(records, project))
}
