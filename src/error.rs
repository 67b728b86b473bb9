//! Crate-wide error type for the parsing and protocol layers.
//!
//! Internal invariant violations (king count, hash mismatch) are not part of
//! this enum: they are `debug_assert!`-style fatal conditions in debug
//! builds and are never expected to surface from valid input, per the
//! engine's error-handling contract.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("parse error at position {position}: {message}")]
    ParseError { message: String, position: usize },

    #[error("illegal move: {uci}")]
    IllegalMove { uci: String },

    #[error("unknown command: {command}")]
    UnknownCommand { command: String },

    #[error("internal invariant violation: {message}")]
    InvariantViolation { message: String },
}

impl EngineError {
    pub fn parse(message: impl Into<String>, position: usize) -> Self {
        EngineError::ParseError {
            message: message.into(),
            position,
        }
    }
}
