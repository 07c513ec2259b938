//! Database collaborator trait

use crate::error::StorageResult;
use async_trait::async_trait;
use sng_core::Row;

/// A graph database that accepts textual statements
///
/// All backends implement this trait.
#[async_trait]
pub trait GraphDatabase: Send + Sync {
    /// Run a statement for its side effects
    async fn execute(&self, statement: &str) -> StorageResult<()> {
        self.query(statement).await.map(|_| ())
    }

    /// Run a statement and fetch its rows. Statements without `RETURN`
    /// produce no rows.
    async fn query(&self, statement: &str) -> StorageResult<Vec<Row>>;

    /// Health check
    async fn health_check(&self) -> StorageResult<bool>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}
