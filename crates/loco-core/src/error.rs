//! Error type for parsing core values.
//!
//! Sub-crates keep their own error enums; `CoreError` only covers the small
//! amount of fallible work done here (text parsing of directions and
//! priorities from configuration files).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid junction direction {0:?}: expected \"straight\" or \"diverted\"")]
    Direction(String),

    #[error("invalid priority {0}: expected 0 (high) or 1 (normal)")]
    Priority(u8),
}

pub type CoreResult<T> = Result<T, CoreError>;
