//! ReDB graph backend

use std::path::Path;

use crate::engine::{self, GraphRead, GraphWrite};
use crate::error::{StorageError, StorageResult};
use crate::parser::parse_statement;
use crate::traits::GraphDatabase;
use async_trait::async_trait;
use redb::{Database, ReadTransaction, ReadableTable, TableDefinition, WriteTransaction};
use sng_core::{EdgeId, EdgeRef, NodeId, NodeRef, Properties, Row};

// Table definitions
const NODES: TableDefinition<u64, &[u8]> = TableDefinition::new("nodes");
const EDGES: TableDefinition<u64, &[u8]> = TableDefinition::new("edges");
const COUNTERS: TableDefinition<&str, u64> = TableDefinition::new("counters");

const NEXT_NODE_ID: &str = "next_node_id";
const NEXT_EDGE_ID: &str = "next_edge_id";

/// ReDB graph backend
///
/// Every statement runs in its own transaction: a failing statement
/// leaves the graph untouched.
pub struct RedbGraph {
    db: Database,
}

impl RedbGraph {
    /// Open or create a ReDB database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;

        // Initialize tables
        {
            let write_txn = db.begin_write()?;
            {
                write_txn.open_table(NODES)?;
                write_txn.open_table(EDGES)?;
                write_txn.open_table(COUNTERS)?;
            }
            write_txn.commit()?;
        }

        Ok(Self { db })
    }
}

#[async_trait]
impl GraphDatabase for RedbGraph {
    async fn query(&self, statement: &str) -> StorageResult<Vec<Row>> {
        let stmt = parse_statement(statement)?;
        if stmt.is_read_only() {
            let read_txn = self.db.begin_read()?;
            engine::run_read(&RedbReader { txn: &read_txn }, &stmt)
        } else {
            let write_txn = self.db.begin_write()?;
            let rows = engine::run(&mut RedbWriter { txn: &write_txn }, &stmt)?;
            write_txn.commit()?;
            Ok(rows)
        }
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        read_txn.open_table(NODES)?;
        Ok(true)
    }

    fn backend_name(&self) -> &'static str {
        "redb"
    }
}

fn decode_all<T: serde::de::DeserializeOwned>(
    range: redb::Range<'_, u64, &'static [u8]>,
) -> StorageResult<Vec<T>> {
    let mut items = Vec::new();
    for entry in range {
        let (_, value) = entry?;
        items.push(serde_json::from_slice(value.value())?);
    }
    Ok(items)
}

struct RedbReader<'a> {
    txn: &'a ReadTransaction,
}

impl GraphRead for RedbReader<'_> {
    fn nodes(&self) -> StorageResult<Vec<NodeRef>> {
        decode_all(self.txn.open_table(NODES)?.iter()?)
    }

    fn edges(&self) -> StorageResult<Vec<EdgeRef>> {
        decode_all(self.txn.open_table(EDGES)?.iter()?)
    }
}

struct RedbWriter<'a> {
    txn: &'a WriteTransaction,
}

impl RedbWriter<'_> {
    fn next_id(&self, counter: &str) -> StorageResult<u64> {
        let mut table = self.txn.open_table(COUNTERS)?;
        let id = table.get(counter)?.map(|v| v.value()).unwrap_or(0);
        table.insert(counter, id + 1)?;
        Ok(id)
    }
}

impl GraphRead for RedbWriter<'_> {
    fn nodes(&self) -> StorageResult<Vec<NodeRef>> {
        decode_all(self.txn.open_table(NODES)?.iter()?)
    }

    fn edges(&self) -> StorageResult<Vec<EdgeRef>> {
        decode_all(self.txn.open_table(EDGES)?.iter()?)
    }
}

impl GraphWrite for RedbWriter<'_> {
    fn create_node(
        &mut self,
        labels: Vec<String>,
        properties: Properties,
    ) -> StorageResult<NodeRef> {
        let node = NodeRef {
            id: NodeId(self.next_id(NEXT_NODE_ID)?),
            labels,
            properties: properties.into(),
        };
        let value = serde_json::to_vec(&node)?;
        let mut table = self.txn.open_table(NODES)?;
        table.insert(node.id.0, value.as_slice())?;
        Ok(node)
    }

    fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        rel_type: String,
        properties: Properties,
    ) -> StorageResult<EdgeRef> {
        {
            let nodes = self.txn.open_table(NODES)?;
            for endpoint in [source, target] {
                if nodes.get(endpoint.0)?.is_none() {
                    return Err(StorageError::NodeNotFound(endpoint.0));
                }
            }
        }
        let edge = EdgeRef {
            id: EdgeId(self.next_id(NEXT_EDGE_ID)?),
            source,
            target,
            rel_type,
            properties,
        };
        let value = serde_json::to_vec(&edge)?;
        let mut table = self.txn.open_table(EDGES)?;
        table.insert(edge.id.0, value.as_slice())?;
        Ok(edge)
    }

    fn delete_node(&mut self, id: NodeId) -> StorageResult<()> {
        let mut table = self.txn.open_table(NODES)?;
        table.remove(id.0)?;
        Ok(())
    }

    fn delete_edge(&mut self, id: EdgeId) -> StorageResult<()> {
        let mut table = self.txn.open_table(EDGES)?;
        table.remove(id.0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_redb_graph() {
        let dir = tempdir().unwrap();
        let db = RedbGraph::open(dir.path().join("graph.redb")).unwrap();
        assert!(db.health_check().await.unwrap());

        db.execute("CREATE (n:User { id:0, name: 'Eddy'});").await.unwrap();
        db.execute("CREATE (n:User { id:1, name: 'Eva'});").await.unwrap();
        db.execute("MATCH (a:User),(b:User) WHERE a.id = 0 AND b.id = 1 CREATE (a)-[r:FRIENDS]->(b);")
            .await
            .unwrap();

        let rows = db
            .query("MATCH (n1)-[e:FRIENDS]-(n2) RETURN n1, n2, e;")
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].node("n1").unwrap().name().unwrap().to_string(), "Eddy");
        assert_eq!(rows[0].edge("e").unwrap().target, NodeId(1));
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.redb");
        {
            let db = RedbGraph::open(&path).unwrap();
            db.execute("CREATE (n:User { id:7, name: 'Tom'})").await.unwrap();
        }

        let db = RedbGraph::open(&path).unwrap();
        let rows = db.query("MATCH (n:User) RETURN n").await.unwrap();
        assert_eq!(rows.len(), 1);

        // Identifiers keep counting after reopen
        db.execute("CREATE (n:User { id:8, name: 'Harry'})").await.unwrap();
        let rows = db.query("MATCH (n {name: 'Harry'}) RETURN n").await.unwrap();
        assert_eq!(rows[0].node("n").unwrap().id, NodeId(1));
    }

    #[tokio::test]
    async fn test_failed_statement_rolls_back() {
        let dir = tempdir().unwrap();
        let db = RedbGraph::open(dir.path().join("graph.redb")).unwrap();

        // Second node reuses a bound variable with new labels and fails
        let err = db
            .execute("CREATE (a:User {name: 'Donna'}), (a:User {name: 'Peter'})")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::VariableRedeclared(_)));

        let rows = db.query("MATCH (n) RETURN n").await.unwrap();
        assert!(rows.is_empty());
    }
}
