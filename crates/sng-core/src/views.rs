//! Tabular views over query results: user listing and friendship pairs

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::{MatchRecord, Row};
use crate::value::PropertyValue;

/// A user as listed by `/get-users`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    /// The node's `id` property
    pub id: PropertyValue,
    pub name: PropertyValue,
}

impl UserView {
    /// Build one view per row from the node bound to `column`
    pub fn from_rows(rows: &[Row], column: &str) -> Result<Vec<Self>> {
        rows.iter()
            .map(|row| {
                let node = row.node(column)?;
                Ok(Self {
                    id: node.properties.require_id(node.id)?.clone(),
                    name: node.name()?.clone(),
                })
            })
            .collect()
    }
}

/// A pair of befriended users by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipView {
    pub user_one: PropertyValue,
    pub user_two: PropertyValue,
}

impl FriendshipView {
    pub fn from_records(records: &[MatchRecord]) -> Result<Vec<Self>> {
        records
            .iter()
            .map(|record| {
                Ok(Self {
                    user_one: record.source.name()?.clone(),
                    user_two: record.target.name()?.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::record::{EdgeId, EdgeRef, NodeId, NodeRef, Value};
    use crate::value::NodeProperties;

    fn user(id: u64, name: &str) -> NodeRef {
        NodeRef::new(NodeId(id + 100))
            .with_label("User")
            .with_properties(NodeProperties::new().with_id(id as i64).with_name(name))
    }

    #[test]
    fn test_users_use_property_id() {
        let rows = vec![
            Row::new().with_column("n", Value::Node(user(0, "Jon"))),
            Row::new().with_column("n", Value::Node(user(1, "Monica"))),
        ];

        let users = UserView::from_rows(&rows, "n").unwrap();
        let json = serde_json::to_value(&users).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"id": 0, "name": "Jon"}, {"id": 1, "name": "Monica"}])
        );
    }

    #[test]
    fn test_user_without_id_property() {
        let node = NodeRef::new(NodeId(3)).with_properties(NodeProperties::new().with_name("Eva"));
        let rows = vec![Row::new().with_column("n", Value::Node(node))];

        let err = UserView::from_rows(&rows, "n").unwrap_err();
        assert!(matches!(err, Error::MissingProperty { ref property, .. } if property == "id"));
    }

    #[test]
    fn test_friendship_names() {
        let (a, b) = (user(0, "Carl"), user(1, "Ron"));
        let edge = EdgeRef::new(EdgeId(1), a.id, b.id, "FRIENDS");
        let records = vec![MatchRecord::new(a, b, edge)];

        let pairs = FriendshipView::from_records(&records).unwrap();
        let json = serde_json::to_value(&pairs).unwrap();
        assert_eq!(json, serde_json::json!([{"userOne": "Carl", "userTwo": "Ron"}]));
    }
}
