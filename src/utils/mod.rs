//! Utility modules.
pub mod num;
