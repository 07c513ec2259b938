//! Error types for SNG Core

use std::path::PathBuf;

use crate::record::NodeId;
use thiserror::Error;

/// Result type alias using SNG's Error
pub type Result<T> = std::result::Result<T, Error>;

/// SNG core error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Node {node} is missing required property '{property}'")]
    MissingProperty { node: NodeId, property: String },

    #[error("Column not found in result row: {0}")]
    MissingColumn(String),

    #[error("Column '{column}' does not hold a {expected}")]
    UnexpectedValue {
        column: String,
        expected: &'static str,
    },

    #[error("Failed to read seed file {path}: {source}")]
    SeedIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
