use crate::test_utils::{bound, iri, named_graph, select, triples, var};
use rdf_fusion_common::error::AlgebraError;
use rdf_fusion_engine::sparql::{Element, Query};
use rdf_fusion_engine::{AlgebraConfig, AlgebraEngine};
use rdf_fusion_logical::{Op, OpRef, Table};
use rdf_fusion_model::{
    Expression, GroundTerm, NamedNodePattern, OrderExpression, TermPattern, TriplePattern,
};
use std::sync::Arc;

fn assert_round_trip(query: &Query) {
    let engine = AlgebraEngine::default();
    let op = engine.compile(query).unwrap();

    let reconstructed = engine.to_query(&op).unwrap();

    assert_eq!(&reconstructed, query);
    assert_eq!(engine.compile(&reconstructed).unwrap(), op);
}

/// Converts `op` into a query and compiles the query again.
fn assert_op_round_trip(op: &OpRef) {
    let engine = AlgebraEngine::default();

    let reconstructed = engine.to_query(op).unwrap();

    assert_eq!(&engine.compile(&reconstructed).unwrap(), op);
}

fn bgp(s: &str, p: &str, o: &str) -> OpRef {
    Op::bgp(vec![TriplePattern {
        subject: TermPattern::Variable(var(s)),
        predicate: NamedNodePattern::NamedNode(iri(p)),
        object: TermPattern::Variable(var(o)),
    }])
}

#[test]
fn named_graph_query() {
    let query = select(
        &["s"],
        Element::Group(vec![named_graph(
            NamedNodePattern::Variable(var("g")),
            vec![triples("s", "p", "o")],
        )]),
    );
    assert_round_trip(&query);
}

#[test]
fn query_with_all_modifiers() {
    let mut query = select(&["s", "n"], Element::Group(vec![triples("s", "p", "o")]));
    query.project[1].1 = Some(Expression::Variable(var("s")));
    query.group_by = vec![(var("s"), None)];
    query.having = vec![bound("s")];
    query.order_by = vec![OrderExpression::Desc(Expression::Variable(var("s")))];
    query.distinct = true;
    query.limit = Some(10);
    assert_round_trip(&query);
}

#[test]
fn optional_with_condition() {
    let query = select(
        &["s", "x"],
        Element::Group(vec![
            triples("s", "p", "o"),
            Element::Optional(Box::new(Element::Group(vec![
                triples("o", "q", "x"),
                Element::Filter(bound("x")),
            ]))),
        ]),
    );
    assert_round_trip(&query);
}

#[test]
fn union_of_groups() {
    let query = Query::new(Element::Group(vec![Element::Union(vec![
        Element::Group(vec![triples("s", "a", "o")]),
        Element::Group(vec![triples("s", "b", "o")]),
        Element::Group(vec![named_graph(
            NamedNodePattern::NamedNode(iri("g")),
            vec![triples("s", "c", "o")],
        )]),
    ])]));
    assert_round_trip(&query);
}

#[test]
fn select_star_with_bind() {
    let query = Query::new(Element::Group(vec![
        triples("s", "p", "o"),
        Element::Bind {
            variable: var("x"),
            expression: Expression::Variable(var("o")),
        },
    ]));
    assert_round_trip(&query);
}

#[test]
fn quad_form_cannot_be_converted() {
    let query = select(&["s"], Element::Group(vec![triples("s", "p", "o")]));
    let engine = AlgebraEngine::new(AlgebraConfig::default().with_quad_form(true));
    let op = engine.compile(&query).unwrap();

    let result = engine.to_query(&op);

    assert_eq!(
        result,
        Err(AlgebraError::UnsupportedReconstruction(
            "QuadPattern".to_owned()
        ))
    );
}

#[test]
fn minus_cannot_be_converted() {
    let query = Query::new(Element::Group(vec![
        triples("s", "p", "o"),
        Element::Minus(Box::new(Element::Group(vec![triples("s", "q", "o")]))),
    ]));
    let engine = AlgebraEngine::default();
    let op = engine.compile(&query).unwrap();

    assert!(matches!(
        engine.to_query(&op),
        Err(AlgebraError::UnsupportedReconstruction(_))
    ));
}

#[test]
fn bind_over_filter_keeps_filter_below() {
    let op: OpRef = Arc::new(Op::Extend {
        bindings: vec![(var("x"), Expression::Variable(var("o")))],
        inner: Op::filter(
            vec![Expression::Not(Box::new(bound("x")))],
            bgp("s", "p", "o"),
        ),
    });
    assert_op_round_trip(&op);
}

#[test]
fn unprojected_let_is_kept() {
    let op: OpRef = Arc::new(Op::Project {
        variables: vec![var("s")],
        inner: Arc::new(Op::Assign {
            bindings: vec![(var("o"), Expression::NamedNode(iri("x")))],
            inner: bgp("s", "p", "o"),
        }),
    });
    assert_op_round_trip(&op);
}

#[test]
fn exists_and_not_exists() {
    let query = Query::new(Element::Group(vec![
        triples("s", "p", "o"),
        Element::Exists(Box::new(Element::Group(vec![triples("o", "q", "x")]))),
        Element::NotExists(Box::new(Element::Group(vec![triples("o", "r", "y")]))),
    ]));
    assert_round_trip(&query);
}

#[test]
fn lateral() {
    let query = select(
        &["s", "x"],
        Element::Group(vec![
            triples("s", "p", "o"),
            Element::Lateral(Box::new(Element::Group(vec![triples("o", "q", "x")]))),
        ]),
    );
    assert_round_trip(&query);
}

#[test]
fn query_level_values() {
    let mut query = select(&["s"], Element::Group(vec![triples("s", "p", "o")]));
    query.values = Some(Table::new(
        vec![var("s")],
        vec![vec![Some(GroundTerm::NamedNode(iri("alice")))]],
    ));
    assert_round_trip(&query);
}
