use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::QueryError;
use crate::query::QueryParams;

/// How unusable filter terms are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Drop the term and keep going.
    #[default]
    Lenient,
    /// Reject the query with a [`QueryError`].
    Strict,
}

/// Server-side settings for [`crate::engine::QueryEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub default_page_size: i32,
    pub max_page_size: i32,
    /// Replace any caller-supplied `maxPageSize` with `max_page_size`.
    pub enforce_max_page_size: bool,
    pub filter_mode: FilterMode,
    pub slow_query_ms: u64,
    pub log_queries: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        let max = std::env::var("SCHOOL_QUERY_MAX_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse::<i32>().ok())
            .unwrap_or(100);
        let slow = std::env::var("SCHOOL_QUERY_SLOW_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(500);
        Self {
            default_page_size: 10,
            max_page_size: max,
            enforce_max_page_size: true,
            filter_mode: FilterMode::Lenient,
            slow_query_ms: slow,
            log_queries: true,
        }
    }
}

impl QueryConfig {
    /// # Errors
    /// Returns an error if the TOML is malformed or the values fail [`QueryConfig::validate`].
    pub fn from_toml_str(s: &str) -> Result<Self, QueryError> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    /// Returns an error if the file cannot be read or does not hold a valid config.
    pub fn load(path: &Path) -> Result<Self, QueryError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| QueryError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// # Errors
    /// Returns an error if a page size is not positive or the default exceeds the maximum.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.max_page_size < 1 {
            return Err(QueryError::Config(format!(
                "max_page_size must be positive, got {}",
                self.max_page_size
            )));
        }
        if self.default_page_size < 1 || self.default_page_size > self.max_page_size {
            return Err(QueryError::Config(format!(
                "default_page_size must be within 1..={}, got {}",
                self.max_page_size, self.default_page_size
            )));
        }
        Ok(())
    }

    /// Fresh params carrying this config's paging defaults.
    #[must_use]
    pub fn default_params(&self) -> QueryParams {
        QueryParams {
            page_size: Some(self.default_page_size),
            max_page_size: self.max_page_size,
            ..QueryParams::default()
        }
    }

    /// Apply the server ceiling and default page size to caller-supplied params.
    #[must_use]
    pub fn normalize(&self, params: &QueryParams) -> QueryParams {
        let mut out = params.clone();
        out.page_size.get_or_insert(self.default_page_size);
        if self.enforce_max_page_size {
            out.max_page_size = self.max_page_size;
        }
        out
    }
}
