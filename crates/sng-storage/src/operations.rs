//! Database operations behind the viewer's endpoints

use sng_core::queries::{CLEAR_STATEMENT, USER_COLUMN};
use sng_core::{
    FriendshipView, GraphQueries, GraphViewProjector, MatchRecord, ProjectionResult,
    RecordColumns, SeedScript, UserView,
};

use crate::error::{StorageError, StorageResult};
use crate::pool::Connection;

/// Delete every node and relationship
pub async fn clear(conn: &Connection) -> StorageResult<()> {
    conn.execute(CLEAR_STATEMENT).await
}

/// Execute seed statements in order, stopping at the first failure.
///
/// Statements applied before the failure stay applied.
pub async fn populate(conn: &Connection, script: &SeedScript) -> StorageResult<usize> {
    for statement in script.iter() {
        tracing::trace!("seed line {}: {}", statement.line, statement.text);
        conn.execute(&statement.text)
            .await
            .map_err(|e| StorageError::MalformedSeedLine {
                line: statement.line,
                source: Box::new(e),
            })?;
    }
    tracing::info!("Seeded database with {} statements", script.len());
    Ok(script.len())
}

/// Clear the database and load the seed script
pub async fn reset(conn: &Connection, script: &SeedScript) -> StorageResult<usize> {
    clear(conn).await?;
    populate(conn, script).await
}

async fn relationship_records(
    conn: &Connection,
    queries: &GraphQueries,
) -> StorageResult<Vec<MatchRecord>> {
    let rows = conn.query(&queries.relationships()).await?;
    Ok(MatchRecord::from_rows(&rows, &RecordColumns::default())?)
}

/// Nodes and links of every relationship of the configured type
pub async fn get_graph(
    conn: &Connection,
    queries: &GraphQueries,
    projector: &GraphViewProjector,
) -> StorageResult<ProjectionResult> {
    let records = relationship_records(conn, queries).await?;
    Ok(projector.project(&records)?)
}

/// `{id, name}` of every user node
pub async fn get_users(conn: &Connection, queries: &GraphQueries) -> StorageResult<Vec<UserView>> {
    let rows = conn.query(&queries.users()).await?;
    Ok(UserView::from_rows(&rows, USER_COLUMN)?)
}

/// Name pairs of every relationship of the configured type
pub async fn get_relationships(
    conn: &Connection,
    queries: &GraphQueries,
) -> StorageResult<Vec<FriendshipView>> {
    let records = relationship_records(conn, queries).await?;
    Ok(FriendshipView::from_records(&records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGraph;
    use crate::pool::ConnectionPool;
    use sng_core::NodeId;
    use std::sync::Arc;

    const SEED: &str = "\
// three users in a chain
CREATE (n:User { id:1, name: 'A'});
CREATE (n:User { id:2, name: 'B'});
CREATE (n:User { id:3, name: 'C'});

MATCH (a:User),(b:User) WHERE a.id = 1 AND b.id = 2 CREATE (a)-[r:FRIENDS]->(b);
MATCH (a:User),(b:User) WHERE a.id = 2 AND b.id = 3 CREATE (a)-[r:FRIENDS]->(b);
";

    async fn seeded() -> (ConnectionPool, Connection) {
        let pool = ConnectionPool::new(Arc::new(MemoryGraph::new()), 4);
        let conn = pool.acquire().await.unwrap();
        let applied = reset(&conn, &SeedScript::parse(SEED)).await.unwrap();
        assert_eq!(applied, 5);
        (pool, conn)
    }

    #[tokio::test]
    async fn test_get_graph() {
        let (_pool, conn) = seeded().await;
        let graph = get_graph(&conn, &GraphQueries::default(), &GraphViewProjector::new())
            .await
            .unwrap();

        let names: Vec<_> = graph.nodes.iter().map(|n| n.name.to_string()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        // Undirected match: each relationship appears once per orientation
        assert_eq!(graph.edges.len(), 4);
        assert!(graph
            .edges
            .iter()
            .all(|e| (e.source, e.target) == (NodeId(0), NodeId(1))
                || (e.source, e.target) == (NodeId(1), NodeId(2))));
    }

    #[tokio::test]
    async fn test_get_users() {
        let (_pool, conn) = seeded().await;
        let users = get_users(&conn, &GraphQueries::default()).await.unwrap();
        let json = serde_json::to_value(&users).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"id": 1, "name": "A"},
                {"id": 2, "name": "B"},
                {"id": 3, "name": "C"}
            ])
        );
    }

    #[tokio::test]
    async fn test_get_relationships() {
        let (_pool, conn) = seeded().await;
        let pairs = get_relationships(&conn, &GraphQueries::default())
            .await
            .unwrap();
        let flat: Vec<_> = pairs
            .iter()
            .map(|p| format!("{}-{}", p.user_one, p.user_two))
            .collect();
        assert_eq!(flat, vec!["A-B", "B-A", "B-C", "C-B"]);
    }

    #[tokio::test]
    async fn test_reset_replaces_previous_data() {
        let (_pool, conn) = seeded().await;
        reset(&conn, &SeedScript::parse(SEED)).await.unwrap();
        let users = get_users(&conn, &GraphQueries::default()).await.unwrap();
        assert_eq!(users.len(), 3);
    }

    #[tokio::test]
    async fn test_bad_seed_line_stops_loading() {
        let pool = ConnectionPool::new(Arc::new(MemoryGraph::new()), 1);
        let conn = pool.acquire().await.unwrap();
        let script = SeedScript::parse(
            "CREATE (n:User { id:1, name: 'A'});\nCREATE (n:User { id:2\nCREATE (n:User { id:3, name: 'C'});\n",
        );

        let err = populate(&conn, &script).await.unwrap_err();
        assert!(matches!(err, StorageError::MalformedSeedLine { line: 2, .. }));

        // The first line stays applied, the third never ran
        let users = get_users(&conn, &GraphQueries::default()).await.unwrap();
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_name_surfaces() {
        let pool = ConnectionPool::new(Arc::new(MemoryGraph::new()), 1);
        let conn = pool.acquire().await.unwrap();
        conn.execute("CREATE (a:User {id: 1})-[:FRIENDS]->(b:User {id: 2, name: 'B'})")
            .await
            .unwrap();

        let err = get_graph(&conn, &GraphQueries::default(), &GraphViewProjector::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::Record(sng_core::Error::MissingProperty { .. })
        ));
    }

    #[tokio::test]
    async fn test_numeric_name_is_served() {
        let pool = ConnectionPool::new(Arc::new(MemoryGraph::new()), 1);
        let conn = pool.acquire().await.unwrap();
        conn.execute("CREATE (a:User {id: 1, name: 42})-[:FRIENDS]->(b:User {id: 2, name: 'B'})")
            .await
            .unwrap();
        let queries = GraphQueries::default();

        let graph = get_graph(&conn, &queries, &GraphViewProjector::new())
            .await
            .unwrap();
        assert_eq!(
            serde_json::to_value(&graph.nodes).unwrap(),
            serde_json::json!([{"id": 0, "name": 42}, {"id": 1, "name": "B"}])
        );

        let users = get_users(&conn, &queries).await.unwrap();
        assert_eq!(
            serde_json::to_value(&users).unwrap(),
            serde_json::json!([{"id": 1, "name": 42}, {"id": 2, "name": "B"}])
        );

        let pairs = get_relationships(&conn, &queries).await.unwrap();
        assert_eq!(
            serde_json::to_value(&pairs[0]).unwrap(),
            serde_json::json!({"userOne": 42, "userTwo": "B"})
        );
    }
}
