//! Records returned by graph queries
//!
//! A query yields [`Row`]s of named columns holding nodes or edges. Rows
//! produced by a single-hop traversal are narrowed into [`MatchRecord`]s
//! at the boundary, so a missing or mistyped column surfaces as an error
//! before any projection runs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::{NodeProperties, Properties, PropertyValue};

/// Database identifier of a node, stable for the lifetime of the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub u64);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node as returned by the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: NodeId,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: NodeProperties,
}

impl NodeRef {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            labels: Vec::new(),
            properties: NodeProperties::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_properties(mut self, properties: NodeProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// The node's `name` property
    pub fn name(&self) -> Result<&PropertyValue> {
        self.properties.require_name(self.id)
    }
}

/// An edge as returned by the database. Always directed `source -> target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRef {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub rel_type: String,
    #[serde(default)]
    pub properties: Properties,
}

impl EdgeRef {
    pub fn new(id: EdgeId, source: NodeId, target: NodeId, rel_type: impl Into<String>) -> Self {
        Self {
            id,
            source,
            target,
            rel_type: rel_type.into(),
            properties: Properties::new(),
        }
    }
}

/// Value bound to a result column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Value {
    Node(NodeRef),
    Edge(EdgeRef),
}

/// One result row: columns in RETURN order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: impl Into<String>, value: Value) -> Self {
        self.columns.push((name.into(), value));
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn node(&self, column: &str) -> Result<&NodeRef> {
        match self.get(column) {
            Some(Value::Node(node)) => Ok(node),
            Some(_) => Err(Error::UnexpectedValue {
                column: column.to_string(),
                expected: "node",
            }),
            None => Err(Error::MissingColumn(column.to_string())),
        }
    }

    pub fn edge(&self, column: &str) -> Result<&EdgeRef> {
        match self.get(column) {
            Some(Value::Edge(edge)) => Ok(edge),
            Some(_) => Err(Error::UnexpectedValue {
                column: column.to_string(),
                expected: "edge",
            }),
            None => Err(Error::MissingColumn(column.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Column names a traversal query binds its two endpoints and edge to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordColumns {
    pub source: String,
    pub target: String,
    pub edge: String,
}

impl Default for RecordColumns {
    fn default() -> Self {
        Self {
            source: "n1".to_string(),
            target: "n2".to_string(),
            edge: "e".to_string(),
        }
    }
}

/// One matched path: two endpoint nodes and the edge connecting them
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub source: NodeRef,
    pub target: NodeRef,
    pub edge: EdgeRef,
}

impl MatchRecord {
    pub fn new(source: NodeRef, target: NodeRef, edge: EdgeRef) -> Self {
        Self {
            source,
            target,
            edge,
        }
    }

    /// Narrow a result row into a match record
    pub fn from_row(row: &Row, columns: &RecordColumns) -> Result<Self> {
        Ok(Self {
            source: row.node(&columns.source)?.clone(),
            target: row.node(&columns.target)?.clone(),
            edge: row.edge(&columns.edge)?.clone(),
        })
    }

    /// Narrow every row, failing on the first malformed one
    pub fn from_rows(rows: &[Row], columns: &RecordColumns) -> Result<Vec<Self>> {
        rows.iter().map(|row| Self::from_row(row, columns)).collect()
    }
}
