//! In-memory graph backend

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use sng_core::{EdgeId, EdgeRef, NodeId, NodeRef, Properties, Row};

use crate::engine::{self, GraphRead, GraphWrite};
use crate::error::{StorageError, StorageResult};
use crate::parser::parse_statement;
use crate::traits::GraphDatabase;

/// Plain graph state, ordered by identifier
#[derive(Debug, Clone, Default)]
pub struct GraphState {
    nodes: BTreeMap<NodeId, NodeRef>,
    edges: BTreeMap<EdgeId, EdgeRef>,
    next_node_id: u64,
    next_edge_id: u64,
}

impl GraphRead for GraphState {
    fn nodes(&self) -> StorageResult<Vec<NodeRef>> {
        Ok(self.nodes.values().cloned().collect())
    }

    fn edges(&self) -> StorageResult<Vec<EdgeRef>> {
        Ok(self.edges.values().cloned().collect())
    }
}

impl GraphWrite for GraphState {
    fn create_node(
        &mut self,
        labels: Vec<String>,
        properties: Properties,
    ) -> StorageResult<NodeRef> {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        let node = NodeRef {
            id,
            labels,
            properties: properties.into(),
        };
        self.nodes.insert(id, node.clone());
        Ok(node)
    }

    fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        rel_type: String,
        properties: Properties,
    ) -> StorageResult<EdgeRef> {
        for endpoint in [source, target] {
            if !self.nodes.contains_key(&endpoint) {
                return Err(StorageError::NodeNotFound(endpoint.0));
            }
        }
        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;
        let edge = EdgeRef {
            id,
            source,
            target,
            rel_type,
            properties,
        };
        self.edges.insert(id, edge.clone());
        Ok(edge)
    }

    fn delete_node(&mut self, id: NodeId) -> StorageResult<()> {
        self.nodes.remove(&id);
        Ok(())
    }

    fn delete_edge(&mut self, id: EdgeId) -> StorageResult<()> {
        self.edges.remove(&id);
        Ok(())
    }
}

/// In-memory graph database
///
/// Useful for testing and for demos that reseed on every start.
pub struct MemoryGraph {
    state: RwLock<GraphState>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(GraphState::default()),
        }
    }

    pub fn node_count(&self) -> StorageResult<usize> {
        let state = self
            .state
            .read()
            .map_err(|e| StorageError::Unavailable(format!("Lock error: {}", e)))?;
        Ok(state.nodes.len())
    }

    pub fn edge_count(&self) -> StorageResult<usize> {
        let state = self
            .state
            .read()
            .map_err(|e| StorageError::Unavailable(format!("Lock error: {}", e)))?;
        Ok(state.edges.len())
    }
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphDatabase for MemoryGraph {
    async fn query(&self, statement: &str) -> StorageResult<Vec<Row>> {
        let stmt = parse_statement(statement)?;
        if stmt.is_read_only() {
            let state = self
                .state
                .read()
                .map_err(|e| StorageError::Unavailable(format!("Lock error: {}", e)))?;
            engine::run_read(&*state, &stmt)
        } else {
            let mut state = self
                .state
                .write()
                .map_err(|e| StorageError::Unavailable(format!("Lock error: {}", e)))?;
            engine::run(&mut *state, &stmt)
        }
    }

    async fn health_check(&self) -> StorageResult<bool> {
        Ok(self.state.read().is_ok())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
