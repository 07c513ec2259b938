//! Projection of match records into the graph visualization structure

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::{EdgeRef, MatchRecord, NodeId, NodeRef};
use crate::value::PropertyValue;

/// A node as drawn by the front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    /// The `name` property, whatever scalar it holds
    pub name: PropertyValue,
}

impl GraphNode {
    /// Build from a database node; the node must carry a `name`
    pub fn from_node(node: &NodeRef) -> Result<Self> {
        Ok(Self {
            id: node.id,
            name: node.name()?.clone(),
        })
    }
}

/// A link between two drawn nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub rel_type: Option<String>,
}

/// Nodes and links ready for a force-directed renderer
///
/// Every identifier referenced by `edges` appears exactly once in `nodes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub nodes: Vec<GraphNode>,
    #[serde(rename = "links", alias = "edges")]
    pub edges: Vec<GraphEdge>,
}

/// Turns traversal records into a deduplicated node list and an edge list
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphViewProjector {
    edge_types: bool,
}

impl GraphViewProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label every link with its relationship type
    pub fn with_edge_types(mut self) -> Self {
        self.edge_types = true;
        self
    }

    /// Project records in input order.
    ///
    /// One link is emitted per record, duplicates included. Nodes are kept
    /// in first-seen order (source before target within a record) and
    /// deduplicated by database identifier.
    pub fn project<'a, I>(&self, records: I) -> Result<ProjectionResult>
    where
        I: IntoIterator<Item = &'a MatchRecord>,
    {
        let mut nodes: IndexMap<NodeId, GraphNode> = IndexMap::new();
        let mut edges = Vec::new();

        for record in records {
            edges.push(self.edge(&record.edge));

            for node in [&record.source, &record.target] {
                if !nodes.contains_key(&node.id) {
                    nodes.insert(node.id, GraphNode::from_node(node)?);
                }
            }
        }

        tracing::debug!(nodes = nodes.len(), edges = edges.len(), "projected graph view");

        Ok(ProjectionResult {
            nodes: nodes.into_values().collect(),
            edges,
        })
    }

    fn edge(&self, edge: &EdgeRef) -> GraphEdge {
        GraphEdge {
            source: edge.source,
            target: edge.target,
            rel_type: self.edge_types.then(|| edge.rel_type.clone()),
        }
    }
}
