use log::{info, warn};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::QueryConfig;
use crate::utils::num::usize_to_u64;

/// Log target for per-query summary lines.
pub const METRICS_TARGET: &str = "school_query::metrics";

/// Counters owned by one [`crate::engine::QueryEngine`].
#[derive(Debug, Default)]
pub struct QueryMetrics {
    pub queries_total: AtomicU64,
    pub queries_slow_total: AtomicU64,
    pub terms_dropped_total: AtomicU64,
    pub strict_rejections_total: AtomicU64,
    pub source_errors_total: AtomicU64,
}

/// Point-in-time copy of [`QueryMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queries_total: u64,
    pub queries_slow_total: u64,
    pub terms_dropped_total: u64,
    pub strict_rejections_total: u64,
    pub source_errors_total: u64,
}

impl QueryMetrics {
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_total: self.queries_total.load(Ordering::Relaxed),
            queries_slow_total: self.queries_slow_total.load(Ordering::Relaxed),
            terms_dropped_total: self.terms_dropped_total.load(Ordering::Relaxed),
            strict_rejections_total: self.strict_rejections_total.load(Ordering::Relaxed),
            source_errors_total: self.source_errors_total.load(Ordering::Relaxed),
        }
    }

    /// OpenMetrics/Prometheus exposition format (no types/HELP).
    #[must_use]
    pub fn metrics_text(&self) -> String {
        let m = self.snapshot();
        format!(
            "school_query_queries_total {}\n\
             school_query_queries_slow_total {}\n\
             school_query_terms_dropped_total {}\n\
             school_query_strict_rejections_total {}\n\
             school_query_source_errors_total {}\n",
            m.queries_total,
            m.queries_slow_total,
            m.terms_dropped_total,
            m.strict_rejections_total,
            m.source_errors_total,
        )
    }
}

/// Summary of one executed query.
#[derive(Debug, Clone)]
pub struct QueryEvent<'a> {
    pub record: &'a str,
    pub filter: Option<&'a str>,
    pub sort: Option<&'a str>,
    pub duration_ms: u64,
    pub total_count: usize,
    pub returned: usize,
    pub page: i32,
    pub page_size: usize,
    pub dropped: usize,
}

/// SHA-256 of the filter text, so logs never carry raw filter values.
#[must_use]
pub fn filter_hash(filter: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut h = Sha256::new();
    h.update(filter.as_bytes());
    hex::encode(h.finalize())
}

/// Count the query and emit a structured summary line.
///
/// Returns whether the query was slow.
pub fn log_query(cfg: &QueryConfig, metrics: &QueryMetrics, ev: &QueryEvent<'_>) -> bool {
    metrics.queries_total.fetch_add(1, Ordering::Relaxed);
    metrics.terms_dropped_total.fetch_add(usize_to_u64(ev.dropped), Ordering::Relaxed);
    let slow = ev.duration_ms >= cfg.slow_query_ms;
    if slow {
        metrics.queries_slow_total.fetch_add(1, Ordering::Relaxed);
    }
    if !cfg.log_queries {
        return slow;
    }
    let line = serde_json::json!({
        "record": ev.record,
        "filter_hash": ev.filter.map(filter_hash),
        "sort": ev.sort,
        "duration_ms": ev.duration_ms,
        "total_count": ev.total_count,
        "returned": ev.returned,
        "page": ev.page,
        "page_size": ev.page_size,
        "dropped_terms": ev.dropped,
        "slow": slow
    })
    .to_string();
    if slow {
        warn!(target: METRICS_TARGET, "{line}");
    } else {
        info!(target: METRICS_TARGET, "{line}");
    }
    slow
}
