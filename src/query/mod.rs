// Telemetry is a submodule of query
pub mod telemetry;

mod eval;
mod exec;
mod page;
mod parse;
mod sort;
mod types;

pub use eval::{CompiledFilter, Predicate, compile_filter, compile_simple_filter, compile_term};
pub use exec::{
    FnSource, Query, RecordSource, apply_filter, apply_paging, apply_sorting, run_query,
};
pub use page::paginate;
pub use parse::{parse_filter, parse_term};
pub use sort::SortKey;
pub use types::{
    CmpOp, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, DropReason, DroppedTerm, Order,
    PagedResult, ParsedFilter, QueryParams, SortSpec, Term,
};
