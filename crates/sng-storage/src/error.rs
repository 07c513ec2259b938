//! Storage error types

use thiserror::Error;

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Storage-specific error types
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid statement `{statement}`: {message}")]
    Parse { statement: String, message: String },

    #[error("Variable not defined: {0}")]
    UnboundVariable(String),

    #[error("Variable `{0}` already bound")]
    VariableRedeclared(String),

    #[error("Variable `{0}` is not a node")]
    NotANode(String),

    #[error("Unsupported statement: {0}")]
    Unsupported(String),

    #[error("Node not found: {0}")]
    NodeNotFound(u64),

    #[error("Cannot delete node {0} while it still has relationships; use DETACH DELETE")]
    NodeHasRelationships(u64),

    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Seed statement on line {line} failed: {source}")]
    MalformedSeedLine {
        line: usize,
        #[source]
        source: Box<StorageError>,
    },

    #[error("Record error: {0}")]
    Record(#[from] sng_core::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "redb")]
    #[error("ReDB error: {0}")]
    Redb(#[from] ::redb::Error),

    #[cfg(feature = "redb")]
    #[error("ReDB database error: {0}")]
    RedbDatabase(#[from] ::redb::DatabaseError),

    #[cfg(feature = "redb")]
    #[error("ReDB table error: {0}")]
    RedbTable(#[from] ::redb::TableError),

    #[cfg(feature = "redb")]
    #[error("ReDB storage error: {0}")]
    RedbStorage(#[from] ::redb::StorageError),

    #[cfg(feature = "redb")]
    #[error("ReDB commit error: {0}")]
    RedbCommit(#[from] ::redb::CommitError),

    #[cfg(feature = "redb")]
    #[error("ReDB transaction error: {0}")]
    RedbTransaction(#[from] ::redb::TransactionError),
}
