//! Statements issued against the graph database

use serde::{Deserialize, Serialize};

/// Removes every node together with its relationships
pub const CLEAR_STATEMENT: &str = "MATCH (node) DETACH DELETE node";

/// Column the user listing binds each node to
pub const USER_COLUMN: &str = "n";

/// The label and relationship type the views read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQueries {
    pub user_label: String,
    pub relationship_type: String,
}

impl Default for GraphQueries {
    fn default() -> Self {
        Self {
            user_label: "User".to_string(),
            relationship_type: "FRIENDS".to_string(),
        }
    }
}

impl GraphQueries {
    pub fn new(user_label: impl Into<String>, relationship_type: impl Into<String>) -> Self {
        Self {
            user_label: user_label.into(),
            relationship_type: relationship_type.into(),
        }
    }

    /// All nodes carrying the user label, bound to [`USER_COLUMN`]
    pub fn users(&self) -> String {
        format!("MATCH ({}:{}) RETURN {};", USER_COLUMN, self.user_label, USER_COLUMN)
    }

    /// Every relationship of the configured type, matched in both
    /// orientations, bound to the default record columns `n1`, `n2`, `e`
    pub fn relationships(&self) -> String {
        format!(
            "MATCH (n1)-[e:{}]-(n2) RETURN n1, n2, e;",
            self.relationship_type
        )
    }
}
