//! Property values and typed node property records

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::NodeId;

/// Untyped property map as stored on edges and parsed from statements
pub type Properties = BTreeMap<String, PropertyValue>;

/// A scalar property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Equality as used by pattern filters: integers and floats compare
    /// numerically and null never matches anything.
    pub fn matches(&self, other: &PropertyValue) -> bool {
        match (self, other) {
            (Self::Null, _) | (_, Self::Null) => false,
            (Self::Integer(a), Self::Float(b)) | (Self::Float(b), Self::Integer(a)) => {
                (*a as f64) == *b
            }
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for PropertyValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Properties of a node with the fields the views rely on pulled out
///
/// `id` is the application-level identifier stored as a property, not the
/// database identifier of the node. Both hold any non-null scalar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Properties", into = "Properties")]
pub struct NodeProperties {
    pub id: Option<PropertyValue>,
    pub name: Option<PropertyValue>,
    /// Every other property
    pub extra: Properties,
}

impl NodeProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<PropertyValue>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<PropertyValue>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Look up any property by key
    pub fn get(&self, key: &str) -> Option<PropertyValue> {
        match key {
            "id" if self.id.is_some() => self.id.clone(),
            "name" if self.name.is_some() => self.name.clone(),
            _ => self.extra.get(key).cloned(),
        }
    }

    /// The `name` property, required by every view
    pub fn require_name(&self, node: NodeId) -> Result<&PropertyValue> {
        self.name.as_ref().ok_or_else(|| Error::MissingProperty {
            node,
            property: "name".to_string(),
        })
    }

    /// The `id` property
    pub fn require_id(&self, node: NodeId) -> Result<&PropertyValue> {
        self.id.as_ref().ok_or_else(|| Error::MissingProperty {
            node,
            property: "id".to_string(),
        })
    }

    /// Flatten back into an untyped map
    pub fn to_properties(&self) -> Properties {
        let mut props = self.extra.clone();
        if let Some(id) = &self.id {
            props.insert("id".to_string(), id.clone());
        }
        if let Some(name) = &self.name {
            props.insert("name".to_string(), name.clone());
        }
        props
    }
}

impl From<NodeProperties> for Properties {
    fn from(props: NodeProperties) -> Self {
        props.to_properties()
    }
}

impl From<Properties> for NodeProperties {
    fn from(mut props: Properties) -> Self {
        let id = props.remove("id").filter(|v| !v.is_null());
        let name = props.remove("name").filter(|v| !v.is_null());
        Self {
            id,
            name,
            extra: props,
        }
    }
}
