use school_query::QueryConfig;
use school_query::QueryEngine;
use school_query::query::QueryParams;
use std::fs;
use tempfile::tempdir;

#[path = "_support/fixtures.rs"]
mod fixtures;

#[test]
fn configure_logging_writes_app_and_metrics_in_dir() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("query_logs");
    school_query::logger::configure_logging(Some(&base), Some("debug"), Some(3)).unwrap();
    log::info!("hello app");
    log::info!(target: "school_query::metrics", "metric event");
    assert!(base.join("query.log").exists());
    assert!(base.join("metrics.log").exists());

    // reconfiguring replaces the active config instead of failing
    let other = dir.path().join("second");
    school_query::logger::configure_logging(Some(&other), Some("info"), None).unwrap();
    let eng = QueryEngine::new(QueryConfig { slow_query_ms: 0, ..QueryConfig::default() }).unwrap();
    let params = QueryParams::new().with_filter("Nombre:Ana");
    eng.execute_records::<fixtures::Grade, _, _, _, _>(fixtures::grades(), &params, |g| g.id).unwrap();
    log::logger().flush();
    let metrics = fs::read_to_string(other.join("metrics.log")).unwrap();
    assert!(metrics.contains("\"filter_hash\""));
    assert!(!metrics.contains("Nombre:Ana"));
    assert!(metrics.contains("\"slow\":true"));
}
