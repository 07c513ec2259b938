//! Random seed file generation

use rand::seq::SliceRandom;
use rand::Rng;

use crate::queries::GraphQueries;

/// First names assigned to generated users
pub const NAMES: &[&str] = &[
    "Jon", "Monica", "Carl", "Ron", "Anna", "Lucy", "Eddy", "Eva", "Tom", "Harry", "Donna",
    "Jessica", "Peter", "Ritta", "Sarah", "Rodney", "Phyllis", "Meredith", "Angela", "Kelly",
    "Armando", "Kindra", "Monty", "Jona", "Val", "Lenny", "Bruce", "Simon", "Hector", "Laura",
    "Oleta", "Drucilla", "Rick", "Morty", "Jerry", "Beth", "Summer", "Eric", "Kenny",
];

/// Produces seed files of users joined by random relationships
#[derive(Debug, Clone)]
pub struct SeedGenerator {
    /// Number of user nodes
    pub nodes: usize,
    /// Each round adds one outgoing relationship per user
    pub rounds: usize,
    pub queries: GraphQueries,
}

impl Default for SeedGenerator {
    fn default() -> Self {
        Self {
            nodes: 300,
            rounds: 2,
            queries: GraphQueries::default(),
        }
    }
}

impl SeedGenerator {
    pub fn new(nodes: usize, rounds: usize) -> Self {
        Self {
            nodes,
            rounds,
            ..Self::default()
        }
    }

    pub fn with_queries(mut self, queries: GraphQueries) -> Self {
        self.queries = queries;
        self
    }

    /// Render the seed file. Ids are `0..nodes`; relationship targets are
    /// drawn uniformly, self-loops included.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> String {
        let label = &self.queries.user_label;
        let rel_type = &self.queries.relationship_type;
        let mut out = String::new();

        for id in 0..self.nodes {
            let name = NAMES.choose(rng).copied().unwrap_or("Jon");
            out.push_str(&format!(
                "CREATE (n:{} {{ id:{}, name: '{}'}});\n",
                label, id, name
            ));
        }

        if self.nodes > 0 {
            for _ in 0..self.rounds {
                for id in 0..self.nodes {
                    let other = rng.gen_range(0..self.nodes);
                    out.push_str(&format!(
                        "MATCH (a:{label}),(b:{label}) WHERE a.id = {} AND b.id = {} CREATE (a)-[r:{}]->(b);\n",
                        id, other, rel_type
                    ));
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::SeedScript;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_line_counts() {
        let mut rng = StdRng::seed_from_u64(7);
        let text = SeedGenerator::new(10, 2).generate(&mut rng);
        let script = SeedScript::parse(&text);

        assert_eq!(script.len(), 10 + 20);
        let creates = script
            .iter()
            .filter(|s| s.text.starts_with("CREATE (n:User"))
            .count();
        assert_eq!(creates, 10);
        assert!(script.statements[10].text.contains("CREATE (a)-[r:FRIENDS]->(b)"));
    }

    #[test]
    fn test_same_seed_same_output() {
        let generator = SeedGenerator::new(5, 1);
        let a = generator.generate(&mut StdRng::seed_from_u64(42));
        let b = generator.generate(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_nodes_no_relationships() {
        let text = SeedGenerator::new(0, 3).generate(&mut StdRng::seed_from_u64(1));
        assert!(text.is_empty());
    }
}
