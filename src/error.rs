use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PolicyError {
    #[error("cannot compare {left} with {right}")]
    TypeMismatch { left: String, right: String },

    #[error("invalid exclusion: {exclusion} is not a proper subset of {inclusion}")]
    InvalidExclusion { inclusion: String, exclusion: String },

    #[error("undefined operation: cannot take the {operation} of a {lhs} shard with a {rhs} shard")]
    UndefinedOperation {
        operation: String,
        lhs: String,
        rhs: String,
    },

    #[error("cannot reverse conditions with operator {0}")]
    NotReversible(String),

    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("shard limit of {limit} exceeded during {phase}")]
    ShardLimitExceeded { limit: usize, phase: String },

    #[error("shard reduction did not converge after {0} passes")]
    DidNotConverge(usize),

    #[error("failed to parse policy: {0}")]
    ParseError(String),

    #[error("failed to render policy shards: {0}")]
    RenderError(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl From<serde_json::Error> for PolicyError {
    fn from(err: serde_json::Error) -> Self {
        PolicyError::ParseError(err.to_string())
    }
}
