//! SNG Core - Graph model and visualization projection
//!
//! This crate provides the record types returned by the graph database,
//! the projection of match records into the node/link structure consumed
//! by the force-directed graph front end, and seed file handling.

pub mod error;
pub mod generator;
pub mod projection;
pub mod queries;
pub mod record;
pub mod seed;
pub mod value;
pub mod views;

pub use error::{Error, Result};
pub use generator::SeedGenerator;
pub use projection::{GraphEdge, GraphNode, GraphViewProjector, ProjectionResult};
pub use queries::GraphQueries;
pub use record::{EdgeId, EdgeRef, MatchRecord, NodeId, NodeRef, RecordColumns, Row, Value};
pub use seed::{SeedScript, SeedStatement};
pub use value::{NodeProperties, Properties, PropertyValue};
pub use views::{FriendshipView, UserView};
