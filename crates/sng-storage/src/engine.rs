//! Statement evaluation over a property graph
//!
//! Backends expose their graph through [`GraphRead`] and [`GraphWrite`];
//! the evaluator matches patterns against a snapshot of nodes and edges
//! taken at the start of each statement.

use std::collections::{BTreeSet, HashMap, HashSet};

use indexmap::IndexMap;
use sng_core::{EdgeId, EdgeRef, NodeId, NodeRef, Properties, Row, Value};

use crate::ast::{
    Condition, MatchAction, MatchStatement, NodePattern, Pattern, PatternDirection,
    RelationshipPattern, Statement,
};
use crate::error::{StorageError, StorageResult};

/// Read access to a graph
pub trait GraphRead {
    /// All nodes ordered by identifier
    fn nodes(&self) -> StorageResult<Vec<NodeRef>>;

    /// All edges ordered by identifier
    fn edges(&self) -> StorageResult<Vec<EdgeRef>>;
}

/// Write access to a graph. Identifiers are never reused.
pub trait GraphWrite: GraphRead {
    fn create_node(&mut self, labels: Vec<String>, properties: Properties)
        -> StorageResult<NodeRef>;

    fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        rel_type: String,
        properties: Properties,
    ) -> StorageResult<EdgeRef>;

    /// Remove a node; callers remove its edges first
    fn delete_node(&mut self, id: NodeId) -> StorageResult<()>;

    /// Remove an edge; removing a missing edge is a no-op
    fn delete_edge(&mut self, id: EdgeId) -> StorageResult<()>;
}

type Bindings = IndexMap<String, Value>;

/// Result of matching: one binding set per match, plus every variable the
/// patterns declare
struct Matched {
    bindings: Vec<Bindings>,
    declared: HashSet<String>,
}

/// Evaluate a read-only statement
pub fn run_read<G: GraphRead + ?Sized>(graph: &G, stmt: &Statement) -> StorageResult<Vec<Row>> {
    match stmt {
        Statement::Match(m) => match &m.action {
            MatchAction::Return(variables) => {
                let matched = match_patterns(graph, m)?;
                rows(&matched, variables)
            }
            _ => Err(StorageError::Unsupported(
                "write statement on a read-only path".to_string(),
            )),
        },
        Statement::Create(_) => Err(StorageError::Unsupported(
            "write statement on a read-only path".to_string(),
        )),
    }
}

/// Evaluate any statement, returning rows for `RETURN`
pub fn run<G: GraphWrite + ?Sized>(graph: &mut G, stmt: &Statement) -> StorageResult<Vec<Row>> {
    match stmt {
        Statement::Create(patterns) => {
            create(graph, &mut Bindings::new(), patterns)?;
            Ok(Vec::new())
        }
        Statement::Match(m) => {
            let matched = match_patterns(&*graph, m)?;
            match &m.action {
                MatchAction::Return(variables) => rows(&matched, variables),
                MatchAction::Create(patterns) => {
                    for mut binding in matched.bindings {
                        create(graph, &mut binding, patterns)?;
                    }
                    Ok(Vec::new())
                }
                MatchAction::Delete { detach, variables } => {
                    delete(graph, &matched, *detach, variables)?;
                    Ok(Vec::new())
                }
            }
        }
    }
}

fn match_patterns<G: GraphRead + ?Sized>(graph: &G, m: &MatchStatement) -> StorageResult<Matched> {
    let nodes = graph.nodes()?;
    let edges = graph.edges()?;
    let node_index: HashMap<NodeId, &NodeRef> = nodes.iter().map(|n| (n.id, n)).collect();

    let mut bindings = vec![Bindings::new()];
    let mut declared = HashSet::new();
    let mut applied = vec![false; m.conditions.len()];

    for pattern in &m.patterns {
        let mut next = Vec::new();
        for binding in &bindings {
            match pattern {
                Pattern::Node(np) => expand_node(np, binding, &nodes, &mut next)?,
                Pattern::Relationship { left, rel, right } => {
                    expand_relationship(left, rel, right, binding, &edges, &node_index, &mut next)?
                }
            }
        }
        bindings = next;
        declare(pattern, &mut declared);

        // Filter as early as possible to keep cartesian products small
        for (idx, cond) in m.conditions.iter().enumerate() {
            if !applied[idx] && declared.contains(&cond.variable) {
                bindings.retain(|b| condition_holds(b, cond));
                applied[idx] = true;
            }
        }
    }

    if let Some(idx) = applied.iter().position(|done| !done) {
        return Err(StorageError::UnboundVariable(
            m.conditions[idx].variable.clone(),
        ));
    }

    tracing::trace!(matches = bindings.len(), "matched patterns");
    Ok(Matched { bindings, declared })
}

fn declare(pattern: &Pattern, declared: &mut HashSet<String>) {
    let mut add = |var: &Option<String>| {
        if let Some(v) = var {
            declared.insert(v.clone());
        }
    };
    match pattern {
        Pattern::Node(np) => add(&np.variable),
        Pattern::Relationship { left, rel, right } => {
            add(&left.variable);
            add(&rel.variable);
            add(&right.variable);
        }
    }
}

fn node_matches(np: &NodePattern, node: &NodeRef) -> bool {
    np.labels.iter().all(|l| node.has_label(l))
        && np.properties.iter().all(|(key, expected)| {
            node.properties
                .get(key)
                .is_some_and(|actual| actual.matches(expected))
        })
}

fn edge_matches(rel: &RelationshipPattern, edge: &EdgeRef) -> bool {
    rel.rel_type.as_ref().map_or(true, |t| *t == edge.rel_type)
        && rel.properties.iter().all(|(key, expected)| {
            edge.properties
                .get(key)
                .is_some_and(|actual| actual.matches(expected))
        })
}

/// Bind `node` to the pattern under an existing binding, if compatible
fn bind_node(
    np: &NodePattern,
    node: &NodeRef,
    binding: &Bindings,
) -> StorageResult<Option<Bindings>> {
    if !node_matches(np, node) {
        return Ok(None);
    }
    let Some(var) = &np.variable else {
        return Ok(Some(binding.clone()));
    };
    match binding.get(var) {
        Some(Value::Node(bound)) if bound.id == node.id => Ok(Some(binding.clone())),
        Some(Value::Node(_)) => Ok(None),
        Some(Value::Edge(_)) => Err(StorageError::NotANode(var.clone())),
        None => {
            let mut extended = binding.clone();
            extended.insert(var.clone(), Value::Node(node.clone()));
            Ok(Some(extended))
        }
    }
}

fn expand_node(
    np: &NodePattern,
    binding: &Bindings,
    nodes: &[NodeRef],
    out: &mut Vec<Bindings>,
) -> StorageResult<()> {
    if let Some(Value::Node(bound)) = np.variable.as_ref().and_then(|v| binding.get(v)) {
        if node_matches(np, bound) {
            out.push(binding.clone());
        }
        return Ok(());
    }
    for node in nodes {
        if let Some(extended) = bind_node(np, node, binding)? {
            out.push(extended);
        }
    }
    Ok(())
}

fn expand_relationship(
    left: &NodePattern,
    rel: &RelationshipPattern,
    right: &NodePattern,
    binding: &Bindings,
    edges: &[EdgeRef],
    node_index: &HashMap<NodeId, &NodeRef>,
    out: &mut Vec<Bindings>,
) -> StorageResult<()> {
    let bound_edge = match rel.variable.as_ref().and_then(|v| binding.get(v)) {
        Some(Value::Edge(edge)) => Some(edge.id),
        Some(Value::Node(_)) => {
            return Err(StorageError::Unsupported(format!(
                "variable `{}` is a node, not a relationship",
                rel.variable.as_deref().unwrap_or_default()
            )))
        }
        None => None,
    };
    // A relationship is matched at most once per binding
    let used: HashSet<EdgeId> = binding
        .iter()
        .filter(|(name, _)| Some(*name) != rel.variable.as_ref())
        .filter_map(|(_, value)| match value {
            Value::Edge(e) => Some(e.id),
            Value::Node(_) => None,
        })
        .collect();

    for edge in edges {
        if bound_edge.is_some_and(|id| id != edge.id) || used.contains(&edge.id) {
            continue;
        }
        if !edge_matches(rel, edge) {
            continue;
        }

        let orientations = match rel.direction {
            PatternDirection::LeftToRight => vec![(edge.source, edge.target)],
            PatternDirection::RightToLeft => vec![(edge.target, edge.source)],
            PatternDirection::Undirected if edge.source == edge.target => {
                vec![(edge.source, edge.target)]
            }
            PatternDirection::Undirected => {
                vec![(edge.source, edge.target), (edge.target, edge.source)]
            }
        };

        for (left_id, right_id) in orientations {
            let (Some(left_node), Some(right_node)) =
                (node_index.get(&left_id), node_index.get(&right_id))
            else {
                tracing::warn!("edge {} references a missing node", edge.id);
                continue;
            };
            let Some(with_left) = bind_node(left, left_node, binding)? else {
                continue;
            };
            let Some(mut with_both) = bind_node(right, right_node, &with_left)? else {
                continue;
            };
            if let Some(var) = &rel.variable {
                with_both.insert(var.clone(), Value::Edge(edge.clone()));
            }
            out.push(with_both);
        }
    }
    Ok(())
}

fn condition_holds(binding: &Bindings, cond: &Condition) -> bool {
    let actual = match binding.get(&cond.variable) {
        Some(Value::Node(node)) => node.properties.get(&cond.property),
        Some(Value::Edge(edge)) => edge.properties.get(&cond.property).cloned(),
        None => None,
    };
    actual.is_some_and(|v| v.matches(&cond.value))
}

fn check_declared(matched: &Matched, variables: &[String]) -> StorageResult<()> {
    match variables.iter().find(|v| !matched.declared.contains(*v)) {
        Some(missing) => Err(StorageError::UnboundVariable(missing.clone())),
        None => Ok(()),
    }
}

fn rows(matched: &Matched, variables: &[String]) -> StorageResult<Vec<Row>> {
    check_declared(matched, variables)?;
    Ok(matched
        .bindings
        .iter()
        .map(|binding| {
            let columns = variables
                .iter()
                .filter_map(|var| binding.get(var).map(|value| (var.clone(), value.clone())))
                .collect();
            Row { columns }
        })
        .collect())
}

fn create<G: GraphWrite + ?Sized>(
    graph: &mut G,
    binding: &mut Bindings,
    patterns: &[Pattern],
) -> StorageResult<()> {
    for pattern in patterns {
        match pattern {
            Pattern::Node(np) => {
                create_or_reuse_node(graph, binding, np)?;
            }
            Pattern::Relationship { left, rel, right } => {
                let left_id = create_or_reuse_node(graph, binding, left)?;
                let right_id = create_or_reuse_node(graph, binding, right)?;
                let rel_type = rel.rel_type.clone().ok_or_else(|| {
                    StorageError::Unsupported("CREATE requires a relationship type".to_string())
                })?;
                if let Some(var) = &rel.variable {
                    if binding.contains_key(var) {
                        return Err(StorageError::VariableRedeclared(var.clone()));
                    }
                }
                let (source, target) = match rel.direction {
                    PatternDirection::LeftToRight => (left_id, right_id),
                    PatternDirection::RightToLeft => (right_id, left_id),
                    PatternDirection::Undirected => {
                        return Err(StorageError::Unsupported(
                            "CREATE requires a directed relationship".to_string(),
                        ))
                    }
                };
                let edge = graph.create_edge(source, target, rel_type, rel.properties.clone())?;
                if let Some(var) = &rel.variable {
                    binding.insert(var.clone(), Value::Edge(edge));
                }
            }
        }
    }
    Ok(())
}

fn create_or_reuse_node<G: GraphWrite + ?Sized>(
    graph: &mut G,
    binding: &mut Bindings,
    np: &NodePattern,
) -> StorageResult<NodeId> {
    if let Some(var) = &np.variable {
        match binding.get(var) {
            Some(Value::Node(node)) if np.is_reference() => return Ok(node.id),
            Some(Value::Node(_)) => return Err(StorageError::VariableRedeclared(var.clone())),
            Some(Value::Edge(_)) => return Err(StorageError::NotANode(var.clone())),
            None => {}
        }
    }
    let node = graph.create_node(np.labels.clone(), np.properties.clone())?;
    let id = node.id;
    if let Some(var) = &np.variable {
        binding.insert(var.clone(), Value::Node(node));
    }
    Ok(id)
}

fn delete<G: GraphWrite + ?Sized>(
    graph: &mut G,
    matched: &Matched,
    detach: bool,
    variables: &[String],
) -> StorageResult<()> {
    check_declared(matched, variables)?;

    let mut node_ids = BTreeSet::new();
    let mut edge_ids = BTreeSet::new();
    for binding in &matched.bindings {
        for var in variables {
            match binding.get(var) {
                Some(Value::Node(node)) => {
                    node_ids.insert(node.id);
                }
                Some(Value::Edge(edge)) => {
                    edge_ids.insert(edge.id);
                }
                None => {}
            }
        }
    }

    // Decide everything before mutating so a refused delete changes nothing
    let mut incident = BTreeSet::new();
    for edge in graph.edges()? {
        if edge_ids.contains(&edge.id) {
            continue;
        }
        if let Some(node) = [edge.source, edge.target]
            .into_iter()
            .find(|id| node_ids.contains(id))
        {
            if !detach {
                return Err(StorageError::NodeHasRelationships(node.0));
            }
            incident.insert(edge.id);
        }
    }

    for id in edge_ids.iter().chain(incident.iter()) {
        graph.delete_edge(*id)?;
    }
    for id in &node_ids {
        graph.delete_node(*id)?;
    }

    tracing::trace!(
        nodes = node_ids.len(),
        edges = edge_ids.len() + incident.len(),
        "deleted"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::GraphState;
    use crate::parser::parse_statement;
    use sng_core::{MatchRecord, PropertyValue, RecordColumns};

    fn exec(graph: &mut GraphState, text: &str) -> Vec<Row> {
        run(graph, &parse_statement(text).unwrap()).unwrap()
    }

    fn seeded() -> GraphState {
        let mut graph = GraphState::default();
        exec(&mut graph, "CREATE (n:User { id:0, name: 'Jon'});");
        exec(&mut graph, "CREATE (n:User { id:1, name: 'Monica'});");
        exec(&mut graph, "CREATE (n:User { id:2, name: 'Carl'});");
        exec(
            &mut graph,
            "MATCH (a:User),(b:User) WHERE a.id = 0 AND b.id = 1 CREATE (a)-[r:FRIENDS]->(b);",
        );
        exec(
            &mut graph,
            "MATCH (a:User),(b:User) WHERE a.id = 1 AND b.id = 2 CREATE (a)-[r:FRIENDS]->(b);",
        );
        graph
    }

    #[test]
    fn test_seed_shapes() {
        let graph = seeded();
        assert_eq!(graph.nodes().unwrap().len(), 3);
        let edges = graph.edges().unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].rel_type, "FRIENDS");
        assert_eq!((edges[0].source, edges[0].target), (NodeId(0), NodeId(1)));
    }

    #[test]
    fn test_return_nodes_by_label() {
        let mut graph = seeded();
        exec(&mut graph, "CREATE (r:Role {name: 'CTO'})");

        let rows = run_read(&graph, &parse_statement("MATCH (n:User) RETURN n;").unwrap()).unwrap();
        let names: Vec<_> = rows
            .iter()
            .map(|r| r.node("n").unwrap().name().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Jon", "Monica", "Carl"]);
    }

    #[test]
    fn test_undirected_matches_both_orientations() {
        let graph = seeded();
        let rows = run_read(
            &graph,
            &parse_statement("MATCH (n1)-[e:FRIENDS]-(n2) RETURN n1,n2,e;").unwrap(),
        )
        .unwrap();
        assert_eq!(rows.len(), 4);

        let records = MatchRecord::from_rows(&rows, &RecordColumns::default()).unwrap();
        let pairs: Vec<_> = records
            .iter()
            .map(|r| (r.source.id.0, r.target.id.0, r.edge.source.0, r.edge.target.0))
            .collect();
        assert_eq!(
            pairs,
            vec![(0, 1, 0, 1), (1, 0, 0, 1), (1, 2, 1, 2), (2, 1, 1, 2)]
        );
    }

    #[test]
    fn test_directed_match() {
        let graph = seeded();
        let out = run_read(
            &graph,
            &parse_statement("MATCH (a {name: 'Monica'})-[e:FRIENDS]->(b) RETURN b").unwrap(),
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].node("b").unwrap().id, NodeId(2));

        let incoming = run_read(
            &graph,
            &parse_statement("MATCH (a {name: 'Monica'})<-[e:FRIENDS]-(b) RETURN b").unwrap(),
        )
        .unwrap();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].node("b").unwrap().id, NodeId(0));
    }

    #[test]
    fn test_where_on_missing_property_filters_out() {
        let graph = seeded();
        let rows = run_read(
            &graph,
            &parse_statement("MATCH (n:User) WHERE n.age = 3 RETURN n").unwrap(),
        )
        .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_unbound_variable() {
        let graph = seeded();
        let err = run_read(&graph, &parse_statement("MATCH (n) RETURN m").unwrap()).unwrap_err();
        assert!(matches!(err, StorageError::UnboundVariable(v) if v == "m"));

        let err = run_read(
            &graph,
            &parse_statement("MATCH (n) WHERE x.id = 1 RETURN n").unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, StorageError::UnboundVariable(v) if v == "x"));
    }

    #[test]
    fn test_detach_delete_everything() {
        let mut graph = seeded();
        exec(&mut graph, "MATCH (node) DETACH DELETE node");
        assert!(graph.nodes().unwrap().is_empty());
        assert!(graph.edges().unwrap().is_empty());
    }

    #[test]
    fn test_plain_delete_refuses_connected_node() {
        let mut graph = seeded();
        let err = run(
            &mut graph,
            &parse_statement("MATCH (n:User) DELETE n").unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, StorageError::NodeHasRelationships(_)));
        // Nothing was removed
        assert_eq!(graph.nodes().unwrap().len(), 3);
        assert_eq!(graph.edges().unwrap().len(), 2);
    }

    #[test]
    fn test_delete_edge_then_node() {
        let mut graph = seeded();
        exec(&mut graph, "MATCH (a {name: 'Jon'})-[e]->(b) DELETE e, a");
        let names: Vec<_> = graph
            .nodes()
            .unwrap()
            .iter()
            .map(|n| n.properties.name.clone().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Monica", "Carl"]);
        assert_eq!(graph.edges().unwrap().len(), 1);
    }

    #[test]
    fn test_ids_not_reused() {
        let mut graph = seeded();
        exec(&mut graph, "MATCH (node) DETACH DELETE node");
        exec(&mut graph, "CREATE (n:User {id: 0, name: 'Again'})");
        assert_eq!(graph.nodes().unwrap()[0].id, NodeId(3));
    }

    #[test]
    fn test_create_path_in_one_statement() {
        let mut graph = GraphState::default();
        exec(
            &mut graph,
            "CREATE (p:Person {name: 'Ana'})-[:HAS_ROLE {since: 2020}]->(r:Role {name: 'Lead'})",
        );
        let edges = graph.edges().unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].properties["since"], PropertyValue::Integer(2020));
        assert_eq!(graph.nodes().unwrap().len(), 2);
    }

    #[test]
    fn test_create_rejects_undirected() {
        let mut graph = seeded();
        let err = run(
            &mut graph,
            &parse_statement("MATCH (a {id: 0}), (b {id: 2}) CREATE (a)-[:FRIENDS]-(b)").unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, StorageError::Unsupported(_)));
    }

    #[test]
    fn test_read_path_refuses_writes() {
        let graph = seeded();
        let err = run_read(&graph, &parse_statement("CREATE (n)").unwrap()).unwrap_err();
        assert!(matches!(err, StorageError::Unsupported(_)));
    }
}
