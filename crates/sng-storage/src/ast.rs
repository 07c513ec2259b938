//! Statement AST for the supported Cypher subset

use sng_core::{Properties, PropertyValue};

/// A parsed statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `CREATE <patterns>`
    Create(Vec<Pattern>),
    /// `MATCH <patterns> [WHERE ...] <action>`
    Match(MatchStatement),
}

impl Statement {
    /// True when running the statement cannot change the graph
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Statement::Match(MatchStatement {
                action: MatchAction::Return(_),
                ..
            })
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchStatement {
    pub patterns: Vec<Pattern>,
    pub conditions: Vec<Condition>,
    pub action: MatchAction,
}

/// What to do with each set of matched bindings
#[derive(Debug, Clone, PartialEq)]
pub enum MatchAction {
    Create(Vec<Pattern>),
    Delete { detach: bool, variables: Vec<String> },
    Return(Vec<String>),
}

/// A single node or a single hop between two nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Node(NodePattern),
    Relationship {
        left: NodePattern,
        rel: RelationshipPattern,
        right: NodePattern,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePattern {
    pub variable: Option<String>,
    pub labels: Vec<String>,
    pub properties: Properties,
}

impl NodePattern {
    pub fn named(variable: impl Into<String>) -> Self {
        Self {
            variable: Some(variable.into()),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// A bare variable reference such as `(a)`
    pub fn is_reference(&self) -> bool {
        self.labels.is_empty() && self.properties.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipPattern {
    pub variable: Option<String>,
    pub rel_type: Option<String>,
    pub properties: Properties,
    pub direction: PatternDirection,
}

/// Arrow direction as written, relative to the left node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternDirection {
    /// `(a)-[]->(b)`
    LeftToRight,
    /// `(a)<-[]-(b)`
    RightToLeft,
    /// `(a)-[]-(b)`
    Undirected,
}

/// `variable.property = literal`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub variable: String,
    pub property: String,
    pub value: PropertyValue,
}
