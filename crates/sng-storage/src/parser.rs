//! nom parser for the statement subset
//!
//! Grammar (keywords case-insensitive, trailing `;` optional):
//!
//! ```text
//! statement  := CREATE patterns
//!             | MATCH patterns [WHERE cond (AND cond)*] action
//! action     := CREATE patterns | [DETACH] DELETE vars | RETURN vars
//! pattern    := node [rel node]
//! node       := '(' [var] (':' label)* [props] ')'
//! rel        := ['<'] '-' '[' [var] [':' type] [props] ']' '-' ['>']
//! cond       := var '.' key '=' literal
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while},
    character::complete::{char, digit1, multispace0, multispace1, satisfy},
    combinator::{all_consuming, map, map_res, not, opt, recognize, value},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, separated_pair, terminated},
    IResult, Parser,
};
use sng_core::{Properties, PropertyValue};

use crate::ast::{
    Condition, MatchAction, MatchStatement, NodePattern, Pattern, PatternDirection,
    RelationshipPattern, Statement,
};
use crate::error::{StorageError, StorageResult};

type ParseError<'a> = nom::error::Error<&'a str>;

/// Parse one complete statement
pub fn parse_statement(input: &str) -> StorageResult<Statement> {
    all_consuming(statement)
        .parse(input)
        .map(|(_, stmt)| stmt)
        .map_err(|e| StorageError::Parse {
            statement: input.trim().to_string(),
            message: e.to_string(),
        })
}

fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = ParseError<'a>>
where
    F: Parser<&'a str, Output = O, Error = ParseError<'a>>,
{
    delimited(multispace0, inner, multispace0)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn keyword<'a>(kw: &'static str) -> impl Parser<&'a str, Output = &'a str, Error = ParseError<'a>> {
    terminated(tag_no_case(kw), not(satisfy(is_ident_char)))
}

fn statement(input: &str) -> IResult<&str, Statement> {
    delimited(
        multispace0,
        alt((create_statement, match_statement)),
        (multispace0, opt(char(';')), multispace0),
    )
    .parse(input)
}

fn create_statement(input: &str) -> IResult<&str, Statement> {
    map(create_clause, Statement::Create).parse(input)
}

fn match_statement(input: &str) -> IResult<&str, Statement> {
    map(
        (
            terminated(keyword("MATCH"), multispace0),
            patterns,
            opt(preceded(ws(keyword("WHERE")), conditions)),
            preceded(
                multispace0,
                alt((
                    map(create_clause, MatchAction::Create),
                    delete_clause,
                    return_clause,
                )),
            ),
        ),
        |(_, patterns, conditions, action)| {
            Statement::Match(MatchStatement {
                patterns,
                conditions: conditions.unwrap_or_default(),
                action,
            })
        },
    )
    .parse(input)
}

fn create_clause(input: &str) -> IResult<&str, Vec<Pattern>> {
    preceded(terminated(keyword("CREATE"), multispace0), patterns).parse(input)
}

fn delete_clause(input: &str) -> IResult<&str, MatchAction> {
    map(
        (
            opt(terminated(keyword("DETACH"), multispace1)),
            terminated(keyword("DELETE"), multispace1),
            variables,
        ),
        |(detach, _, variables)| MatchAction::Delete {
            detach: detach.is_some(),
            variables,
        },
    )
    .parse(input)
}

fn return_clause(input: &str) -> IResult<&str, MatchAction> {
    map(
        preceded(terminated(keyword("RETURN"), multispace1), variables),
        MatchAction::Return,
    )
    .parse(input)
}

fn variables(input: &str) -> IResult<&str, Vec<String>> {
    separated_list1(ws(char(',')), identifier).parse(input)
}

fn patterns(input: &str) -> IResult<&str, Vec<Pattern>> {
    separated_list1(ws(char(',')), pattern).parse(input)
}

fn pattern(input: &str) -> IResult<&str, Pattern> {
    map(
        pair(node_pattern, opt(pair(ws(relationship_pattern), node_pattern))),
        |(left, hop)| match hop {
            Some((rel, right)) => Pattern::Relationship { left, rel, right },
            None => Pattern::Node(left),
        },
    )
    .parse(input)
}

fn node_pattern(input: &str) -> IResult<&str, NodePattern> {
    map(
        delimited(
            char('('),
            (
                ws(opt(identifier)),
                many0(preceded(ws(char(':')), ws(identifier))),
                opt(ws(property_map)),
            ),
            char(')'),
        ),
        |(variable, labels, properties)| NodePattern {
            variable,
            labels,
            properties: properties.unwrap_or_default(),
        },
    )
    .parse(input)
}

fn relationship_pattern(input: &str) -> IResult<&str, RelationshipPattern> {
    map_res(
        (
            opt(char('<')),
            char('-'),
            delimited(
                char('['),
                (
                    ws(opt(identifier)),
                    opt(preceded(ws(char(':')), ws(identifier))),
                    opt(ws(property_map)),
                ),
                char(']'),
            ),
            char('-'),
            opt(char('>')),
        ),
        |(left_arrow, _, (variable, rel_type, properties), _, right_arrow)| -> Result<RelationshipPattern, &'static str> {
            let direction = match (left_arrow.is_some(), right_arrow.is_some()) {
                (false, true) => PatternDirection::LeftToRight,
                (true, false) => PatternDirection::RightToLeft,
                (false, false) => PatternDirection::Undirected,
                (true, true) => return Err("relationship cannot point both ways"),
            };
            Ok(RelationshipPattern {
                variable,
                rel_type,
                properties: properties.unwrap_or_default(),
                direction,
            })
        },
    )
    .parse(input)
}

fn property_map(input: &str) -> IResult<&str, Properties> {
    map(
        delimited(
            char('{'),
            separated_list0(
                char(','),
                separated_pair(ws(identifier), char(':'), ws(literal)),
            ),
            preceded(multispace0, char('}')),
        ),
        |entries: Vec<(String, PropertyValue)>| entries.into_iter().collect(),
    )
    .parse(input)
}

fn conditions(input: &str) -> IResult<&str, Vec<Condition>> {
    separated_list1(ws(keyword("AND")), condition).parse(input)
}

fn condition(input: &str) -> IResult<&str, Condition> {
    map(
        (identifier, char('.'), identifier, ws(char('=')), literal),
        |(variable, _, property, _, value)| Condition {
            variable,
            property,
            value,
        },
    )
    .parse(input)
}

fn identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            satisfy(|c: char| c.is_alphabetic() || c == '_'),
            take_while(is_ident_char),
        )),
        |s: &str| s.to_string(),
    )
    .parse(input)
}

fn literal(input: &str) -> IResult<&str, PropertyValue> {
    alt((string_literal, number_literal, keyword_literal)).parse(input)
}

fn string_literal(input: &str) -> IResult<&str, PropertyValue> {
    map(
        alt((
            delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
        )),
        |s: &str| PropertyValue::String(s.to_string()),
    )
    .parse(input)
}

fn number_literal(input: &str) -> IResult<&str, PropertyValue> {
    map_res(
        recognize((opt(char('-')), digit1, opt(pair(char('.'), digit1)))),
        |text: &str| -> Result<PropertyValue, String> {
            if text.contains('.') {
                text.parse::<f64>()
                    .map(PropertyValue::Float)
                    .map_err(|e| e.to_string())
            } else {
                text.parse::<i64>()
                    .map(PropertyValue::Integer)
                    .map_err(|e| e.to_string())
            }
        },
    )
    .parse(input)
}

fn keyword_literal(input: &str) -> IResult<&str, PropertyValue> {
    alt((
        value(PropertyValue::Bool(true), keyword("true")),
        value(PropertyValue::Bool(false), keyword("false")),
        value(PropertyValue::Null, keyword("null")),
    ))
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(entries: &[(&str, PropertyValue)]) -> Properties {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_create_node() {
        let stmt = parse_statement("CREATE (n:User { id:1, name: 'Jon'});").unwrap();
        assert_eq!(
            stmt,
            Statement::Create(vec![Pattern::Node(NodePattern {
                variable: Some("n".into()),
                labels: vec!["User".into()],
                properties: props(&[("id", 1.into()), ("name", "Jon".into())]),
            })])
        );
    }

    #[test]
    fn test_match_where_create() {
        let stmt = parse_statement(
            "MATCH (a:User),(b:User) WHERE a.id = 0 AND b.id = 12 CREATE (a)-[r:FRIENDS]->(b);\n",
        )
        .unwrap();

        let Statement::Match(m) = stmt else {
            panic!("expected MATCH statement");
        };
        assert_eq!(m.patterns.len(), 2);
        assert_eq!(
            m.conditions,
            vec![
                Condition {
                    variable: "a".into(),
                    property: "id".into(),
                    value: 0.into(),
                },
                Condition {
                    variable: "b".into(),
                    property: "id".into(),
                    value: 12.into(),
                },
            ]
        );
        let MatchAction::Create(created) = m.action else {
            panic!("expected CREATE action");
        };
        assert_eq!(
            created,
            vec![Pattern::Relationship {
                left: NodePattern::named("a"),
                rel: RelationshipPattern {
                    variable: Some("r".into()),
                    rel_type: Some("FRIENDS".into()),
                    properties: Properties::new(),
                    direction: PatternDirection::LeftToRight,
                },
                right: NodePattern::named("b"),
            }]
        );
    }

    #[test]
    fn test_detach_delete() {
        let stmt = parse_statement("MATCH (node) DETACH DELETE node").unwrap();
        assert_eq!(
            stmt,
            Statement::Match(MatchStatement {
                patterns: vec![Pattern::Node(NodePattern::named("node"))],
                conditions: vec![],
                action: MatchAction::Delete {
                    detach: true,
                    variables: vec!["node".into()],
                },
            })
        );
    }

    #[test]
    fn test_undirected_return() {
        let stmt = parse_statement("MATCH (n1)-[e:FRIENDS]-(n2) RETURN n1,n2,e;").unwrap();
        assert!(stmt.is_read_only());
        let Statement::Match(m) = stmt else {
            panic!("expected MATCH statement");
        };
        assert_eq!(
            m.action,
            MatchAction::Return(vec!["n1".into(), "n2".into(), "e".into()])
        );
        let Pattern::Relationship { rel, .. } = &m.patterns[0] else {
            panic!("expected relationship pattern");
        };
        assert_eq!(rel.direction, PatternDirection::Undirected);
    }

    #[test]
    fn test_incoming_and_anonymous() {
        let stmt = parse_statement("match (:Role)<-[:OWNS]-(p) return p").unwrap();
        let Statement::Match(m) = stmt else {
            panic!("expected MATCH statement");
        };
        let Pattern::Relationship { left, rel, right } = &m.patterns[0] else {
            panic!("expected relationship pattern");
        };
        assert_eq!(left.variable, None);
        assert_eq!(left.labels, vec!["Role".to_string()]);
        assert_eq!(rel.variable, None);
        assert_eq!(rel.direction, PatternDirection::RightToLeft);
        assert_eq!(right.variable.as_deref(), Some("p"));
    }

    #[test]
    fn test_literals() {
        let stmt = parse_statement(
            r#"CREATE (t:Task {title: "Ship it", weight: -2.5, done: false, owner: null})"#,
        )
        .unwrap();
        let Statement::Create(patterns) = stmt else {
            panic!("expected CREATE statement");
        };
        let Pattern::Node(node) = &patterns[0] else {
            panic!("expected node pattern");
        };
        assert_eq!(node.properties["title"], PropertyValue::String("Ship it".into()));
        assert_eq!(node.properties["weight"], PropertyValue::Float(-2.5));
        assert_eq!(node.properties["done"], PropertyValue::Bool(false));
        assert_eq!(node.properties["owner"], PropertyValue::Null);
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in [
            "CREATE (n:User {id:1",
            "MATCH (n) RETURN",
            "MATCH (a)<-[e]->(b) RETURN a",
            "DROP DATABASE",
            "MATCH (n) DELETEn",
            "",
        ] {
            let err = parse_statement(bad).unwrap_err();
            assert!(matches!(err, StorageError::Parse { .. }), "{bad}");
        }
    }

    #[test]
    fn test_keyword_prefix_is_not_keyword() {
        assert!(parse_statement("CREATED (n)").is_err());
        assert!(parse_statement("MATCH (n) RETURNS n").is_err());
    }
}
