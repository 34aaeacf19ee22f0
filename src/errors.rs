use thiserror::Error;

/// Errors surfaced by the query engine.
///
/// Lenient filtering never produces the filter variants; they are only
/// raised when a caller opts into [`crate::config::FilterMode::Strict`].
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Unknown field in filter term: {0}")]
    UnknownField(String),

    #[error("Operator not supported for field type: {0}")]
    UnsupportedOperator(String),

    #[error("Value does not parse for field type: {0}")]
    InvalidLiteral(String),

    #[error("Malformed filter term: {0}")]
    Syntax(String),

    #[error("Filter matched no usable conditions: {0}")]
    EmptyFilter(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record source error: {0}")]
    Source(Box<dyn std::error::Error + Send + Sync>),
}
