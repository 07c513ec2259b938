//! Bounded connection pool
//!
//! A [`Connection`] is a scoped handle on the shared database. It holds a
//! pool permit for as long as it lives and gives it back when dropped, on
//! success and failure paths alike.

use std::sync::Arc;

use sng_core::Row;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{StorageError, StorageResult};
use crate::traits::GraphDatabase;

/// Hands out at most `size` concurrent connections
#[derive(Clone)]
pub struct ConnectionPool {
    database: Arc<dyn GraphDatabase>,
    permits: Arc<Semaphore>,
    size: usize,
}

impl ConnectionPool {
    pub fn new(database: Arc<dyn GraphDatabase>, size: usize) -> Self {
        let size = size.max(1);
        Self {
            database,
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Wait for a free slot and acquire a connection
    pub async fn acquire(&self) -> StorageResult<Connection> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| StorageError::Unavailable("connection pool closed".to_string()))?;
        tracing::trace!(
            backend = self.database.backend_name(),
            available = self.permits.available_permits(),
            "connection acquired"
        );
        Ok(Connection {
            database: Arc::clone(&self.database),
            _permit: permit,
        })
    }

    /// Connections that can be acquired without waiting
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn backend_name(&self) -> &'static str {
        self.database.backend_name()
    }

    /// Stop handing out connections; pending and future acquires fail
    pub fn close(&self) {
        self.permits.close();
    }
}

/// A connection checked out of a [`ConnectionPool`]
pub struct Connection {
    database: Arc<dyn GraphDatabase>,
    _permit: OwnedSemaphorePermit,
}

impl Connection {
    pub async fn execute(&self, statement: &str) -> StorageResult<()> {
        tracing::trace!("execute: {}", statement);
        self.database.execute(statement).await
    }

    pub async fn query(&self, statement: &str) -> StorageResult<Vec<Row>> {
        tracing::trace!("query: {}", statement);
        self.database.query(statement).await
    }

    pub async fn health_check(&self) -> StorageResult<bool> {
        self.database.health_check().await
    }
}
