use log::debug;
use std::borrow::Borrow;
use std::sync::atomic::Ordering;
use std::time::Instant;

use crate::config::QueryConfig;
use crate::errors::QueryError;
use crate::query::telemetry::{self, QueryEvent, QueryMetrics};
use crate::query::{PagedResult, Query, QueryParams, RecordSource};
use crate::shape::Record;
use crate::utils::num::u128_to_u64_saturating;

/// Configured entry point: applies server paging limits and the filter mode,
/// and reports every query through its own metrics.
#[derive(Debug, Default)]
pub struct QueryEngine {
    config: QueryConfig,
    metrics: QueryMetrics,
}

impl QueryEngine {
    /// # Errors
    /// Returns [`QueryError::Config`] if the config does not validate.
    pub fn new(config: QueryConfig) -> Result<Self, QueryError> {
        config.validate()?;
        Ok(Self { config, metrics: QueryMetrics::default() })
    }

    #[must_use]
    pub const fn config(&self) -> &QueryConfig {
        &self.config
    }

    #[must_use]
    pub const fn metrics(&self) -> &QueryMetrics {
        &self.metrics
    }

    /// Params pre-filled with this engine's paging defaults.
    #[must_use]
    pub fn params(&self) -> QueryParams {
        self.config.default_params()
    }

    /// Normalize `params` against the config and compile them for `T`.
    ///
    /// # Errors
    /// Only in strict mode, when a filter term is unusable.
    pub fn prepare<T: Record>(&self, params: &QueryParams) -> Result<Query<T>, QueryError> {
        let normalized = self.config.normalize(params);
        Query::<T>::compile_with_mode(&normalized, self.config.filter_mode).inspect_err(|_| {
            self.metrics.strict_rejections_total.fetch_add(1, Ordering::Relaxed);
        })
    }

    /// Run a query over an in-memory sequence.
    ///
    /// # Errors
    /// Only in strict mode, when a filter term is unusable.
    pub fn execute_records<T, B, I, R, F>(
        &self,
        records: I,
        params: &QueryParams,
        project: F,
    ) -> Result<PagedResult<R>, QueryError>
    where
        T: Record,
        B: Borrow<T>,
        I: IntoIterator<Item = B>,
        F: FnMut(B) -> R,
    {
        let start = Instant::now();
        let query = self.prepare::<T>(params)?;
        let page = query.run(records, project);
        self.report(&query, &page, start);
        Ok(page)
    }

    /// Load from `source` and run the query.
    ///
    /// # Errors
    /// Source failures are wrapped in [`QueryError::Source`]; strict mode can
    /// also reject the filter before the source is touched.
    pub fn execute<T, S, R, F>(
        &self,
        source: &S,
        params: &QueryParams,
        project: F,
    ) -> Result<PagedResult<R>, QueryError>
    where
        T: Record,
        S: RecordSource<T> + ?Sized,
        S::Error: std::error::Error + Send + Sync + 'static,
        F: FnMut(T) -> R,
    {
        let start = Instant::now();
        let query = self.prepare::<T>(params)?;
        let records = source.records().map_err(|e| {
            self.metrics.source_errors_total.fetch_add(1, Ordering::Relaxed);
            debug!("record source for {} failed: {e}", T::shape().name());
            QueryError::Source(Box::new(e))
        })?;
        let page = query.run(records, project);
        self.report(&query, &page, start);
        Ok(page)
    }

    fn report<T: Record, R>(&self, query: &Query<T>, page: &PagedResult<R>, start: Instant) {
        let params = query.params();
        let ev = QueryEvent {
            record: T::shape().name(),
            filter: params.filter_expr(),
            sort: params.sort_field.as_deref(),
            duration_ms: u128_to_u64_saturating(start.elapsed().as_millis()),
            total_count: page.total_count,
            returned: page.items.len(),
            page: page.page,
            page_size: page.page_size,
            dropped: query.dropped_terms().len(),
        };
        telemetry::log_query(&self.config, &self.metrics, &ev);
    }
}
