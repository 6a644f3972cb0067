use crate::test_utils::{bound, iri, named_graph, select, triples, var};
use rdf_fusion_common::error::AlgebraError;
use rdf_fusion_engine::sparql::{Element, Query};
use rdf_fusion_engine::{AlgebraConfig, AlgebraEngine};
use rdf_fusion_logical::{ExtensionRegistry, OpaqueExtensionBuilder};
use rdf_fusion_model::{Expression, NamedNodePattern, OrderExpression};
use std::sync::Arc;

#[test]
fn modifiers_wrap_in_fixed_order() {
    let mut query = select(&["s", "n"], Element::Group(vec![triples("s", "p", "o")]));
    query.project[1].1 = Some(Expression::Variable(var("s")));
    query.group_by = vec![(var("s"), None)];
    query.having = vec![bound("s")];
    query.order_by = vec![OrderExpression::Asc(Expression::Variable(var("s")))];
    query.distinct = true;
    query.offset = Some(1);
    query.limit = Some(10);

    let op = AlgebraEngine::default().compile(&query).unwrap();

    insta::assert_snapshot!(op, @r"
    Slice: offset=1 limit=10
      Distinct
        Project: ?s ?n
          Assign: ?n := ?s
            Order: ASC(?s)
              Filter: BOUND(?s)
                Group: ?s
                  Bgp (?s <http://example.com/p> ?o)
    ");
}

#[test]
fn optional_filter_is_hoisted_into_left_join() {
    let query = Query::new(Element::Group(vec![
        triples("s", "p", "o"),
        Element::Optional(Box::new(Element::Group(vec![
            triples("o", "q", "x"),
            Element::Filter(bound("x")),
        ]))),
    ]));

    let op = AlgebraEngine::default().compile(&query).unwrap();

    insta::assert_snapshot!(op, @r"
    LeftJoin: BOUND(?x)
      Bgp (?s <http://example.com/p> ?o)
      Bgp (?o <http://example.com/q> ?x)
    ");
}

#[test]
fn nested_filters_in_optional_fail_with_early_simplification() {
    let query = Query::new(Element::Group(vec![Element::Optional(Box::new(
        Element::Group(vec![
            Element::Group(vec![triples("s", "p", "o"), Element::Filter(bound("o"))]),
            Element::Filter(bound("s")),
        ]),
    ))]));
    let engine = AlgebraEngine::new(AlgebraConfig::default().with_simplify_early(true));

    let result = engine.compile(&query);

    assert!(matches!(
        result,
        Err(AlgebraError::InternalCompilerError(_))
    ));
}

#[test]
fn early_simplification_absorbs_join_identity() {
    let query = Query::new(Element::Group(vec![
        triples("s", "p", "o"),
        Element::Group(vec![triples("o", "q", "x")]),
    ]));
    let engine = AlgebraEngine::new(AlgebraConfig::default().with_simplify_early(true));

    let op = engine.compile(&query).unwrap();

    insta::assert_snapshot!(op, @r"
    Join
      Bgp (?s <http://example.com/p> ?o)
      Bgp (?o <http://example.com/q> ?x)
    ");
}

#[test]
fn single_branch_union_is_the_branch() {
    let query = Query::new(Element::Group(vec![Element::Union(vec![Element::Group(
        vec![triples("s", "p", "o")],
    )])]));

    let op = AlgebraEngine::default().compile(&query).unwrap();

    insta::assert_snapshot!(op, @"Bgp (?s <http://example.com/p> ?o)");
}

#[test]
fn empty_union_is_an_internal_error() {
    let query = Query::new(Element::Group(vec![Element::Union(Vec::new())]));

    let result = AlgebraEngine::default().compile(&query);

    assert!(matches!(
        result,
        Err(AlgebraError::InternalCompilerError(_))
    ));
}

#[test]
fn fixed_filter_position_is_not_hoisted() {
    let query = Query::new(Element::Group(vec![
        Element::Filter(bound("o")),
        triples("s", "p", "o"),
    ]));
    let engine = AlgebraEngine::new(AlgebraConfig::default().with_fixed_filter_position(true));

    let op = engine.compile(&query).unwrap();

    insta::assert_snapshot!(op, @r"
    Join
      Filter: BOUND(?o)
        Table: unit
      Bgp (?s <http://example.com/p> ?o)
    ");
}

#[test]
fn unknown_extension_is_an_internal_error() {
    let query = Query::new(Element::Group(vec![Element::Extension {
        tag: "ex:missing".to_owned(),
        args: Vec::new(),
    }]));

    let result = AlgebraEngine::default().compile(&query);

    assert!(matches!(
        result,
        Err(AlgebraError::InternalCompilerError(_))
    ));
}

#[test]
fn registered_extension_is_joined() {
    let mut registry = ExtensionRegistry::new();
    registry.register(Arc::new(OpaqueExtensionBuilder::new("ex:op")));
    let engine = AlgebraEngine::with_registry(AlgebraConfig::default(), Arc::new(registry));
    let query = Query::new(Element::Group(vec![
        triples("s", "p", "o"),
        Element::Extension {
            tag: "ex:op".to_owned(),
            args: vec![Expression::Variable(var("o"))],
        },
    ]));

    let op = engine.compile(&query).unwrap();

    insta::assert_snapshot!(op, @r"
    Join
      Bgp (?s <http://example.com/p> ?o)
      Extension: ex:op ?o
    ");
}

#[test]
fn quad_form_pushes_graphs_into_patterns() {
    let query = Query::new(Element::Group(vec![
        named_graph(
            NamedNodePattern::NamedNode(iri("g")),
            vec![triples("s", "p", "o")],
        ),
        triples("s", "q", "x"),
    ]));
    let engine = AlgebraEngine::new(AlgebraConfig::default().with_quad_form(true));

    let op = engine.compile(&query).unwrap();

    insta::assert_snapshot!(op, @r"
    Join
      QuadPattern <http://example.com/g> (?s <http://example.com/p> ?o)
      QuadPattern <urn:x-arq:DefaultGraphNode> (?s <http://example.com/q> ?x)
    ");
}

#[test]
fn empty_graph_becomes_dataset_names() {
    let query = Query::new(Element::Group(vec![named_graph(
        NamedNodePattern::Variable(var("g")),
        Vec::new(),
    )]));
    let engine = AlgebraEngine::new(AlgebraConfig::default().with_quad_form(true));

    let op = engine.compile(&query).unwrap();

    insta::assert_snapshot!(op, @"DatasetNames ?g");
}

#[test]
fn union_default_graph_in_quad_form() {
    let query = Query::new(Element::Group(vec![triples("s", "p", "o")]));
    let config = AlgebraConfig::default()
        .with_union_default_graph(true)
        .with_quad_form(true);

    let op = AlgebraEngine::new(config).compile(&query).unwrap();

    insta::assert_snapshot!(op, @r"
    Distinct
      Project: ?s ?o
        QuadPattern ?*g0 (?s <http://example.com/p> ?o)
    ");
}
