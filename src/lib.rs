pub mod config;
pub mod engine;
pub mod errors;
pub mod logger;
pub mod query;
pub mod shape;
pub mod types;
pub mod utils;

pub use config::{FilterMode, QueryConfig};
pub use engine::QueryEngine;
pub use errors::QueryError;
pub use query::{
    FnSource, PagedResult, Query, QueryParams, RecordSource, apply_filter, apply_paging,
    apply_sorting, run_query,
};
pub use shape::{FieldRef, Record, RecordShape, ShapeBuilder};
pub use types::{FieldKind, FieldValue, QueryEnum};

/// Initializes the query subsystem.
///
/// Loads `log4rs.yaml` from the working directory when present; call
/// [`logger::configure_logging`] instead for programmatic setup.
///
/// # Errors
/// Returns an error if the logging config exists but cannot be applied.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    logger::init()?;
    Ok(())
}
