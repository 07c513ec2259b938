//! SNG Storage - Embedded graph database for the graph viewer
//!
//! This crate provides the database collaborator the viewer talks to:
//! a parser for the small Cypher subset used by seed files and view
//! queries, an evaluator over a property graph, in-memory and redb
//! backends, and a bounded connection pool.

#![allow(clippy::result_large_err)]

pub mod ast;
pub mod engine;
pub mod error;
pub mod memory;
pub mod operations;
pub mod parser;
pub mod pool;
pub mod traits;

#[cfg(feature = "redb")]
pub mod redb;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryGraph;
pub use parser::parse_statement;
pub use pool::{Connection, ConnectionPool};
pub use traits::GraphDatabase;

#[cfg(feature = "redb")]
pub use redb::RedbGraph;
