use crate::test_utils::{bgp, graph_iri, graph_var};
use rdf_fusion_logical::quads::quadize;
use rdf_fusion_logical::transform::{transform, TransformSimplify};
use rdf_fusion_logical::union_graph::rewrite_union_default_graph;
use rdf_fusion_logical::Op;
use std::sync::Arc;

#[test]
fn simplify_then_quadize() {
    let op = Op::join(
        Op::unit(),
        Op::left_join(
            Op::join(Op::unit(), bgp(&[("s", "p", "o")])),
            Op::graph(
                graph_iri("http://example.com/g"),
                Op::join(bgp(&[("s", "q", "x")]), Op::unit()),
            ),
            vec![],
        ),
    );

    let simplified = transform(&mut TransformSimplify, &op).unwrap();
    let result = quadize(&simplified).unwrap();

    insta::assert_snapshot!(result, @r"
    LeftJoin
      QuadPattern <urn:x-arq:DefaultGraphNode> (?s <http://example.com/p> ?o)
      QuadPattern <http://example.com/g> (?s <http://example.com/q> ?x)
    ");
}

#[test]
fn union_rewrite_then_quadize() {
    let op = Op::join(
        bgp(&[("s", "p", "o")]),
        Op::graph(graph_var("g"), bgp(&[("o", "q", "x")])),
    );

    let rewritten = rewrite_union_default_graph(&op).unwrap();
    let result = quadize(&rewritten).unwrap();

    insta::assert_snapshot!(result, @r"
    Join
      Distinct
        Project: ?s ?o
          QuadPattern ?*g0 (?s <http://example.com/p> ?o)
      QuadPattern ?g (?o <http://example.com/q> ?x)
    ");
}

#[test]
fn rewrites_share_untouched_subtrees() {
    let named = Op::graph(graph_var("g"), Op::bgp(vec![]));
    let op = Op::union(bgp(&[("s", "p", "o")]), Arc::clone(&named));

    let result = rewrite_union_default_graph(&op).unwrap();

    assert!(!Arc::ptr_eq(&op, &result));
    assert!(Arc::ptr_eq(result.inputs()[1], &named));
}
