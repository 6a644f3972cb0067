use crate::{example_quad, example_quad_in_graph, example_quad_with, iri};
use insta::assert_debug_snapshot;
use rdf_fusion_common::error::StorageError;
use rdf_fusion_common::QuadStorage;
use rdf_fusion_model::vocab::arq;
use rdf_fusion_model::{GraphName, NamedOrBlankNode, TermRef};
use rdf_fusion_storage::memory::MemQuadStorage;

#[test]
fn insert_quad() {
    let storage = MemQuadStorage::new();

    let inserted = storage.insert_quads(vec![example_quad()]).unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(storage.len().unwrap(), 1);
}

#[test]
fn insert_duplicate_quads_no_effect() {
    let storage = MemQuadStorage::new();

    storage.insert_quads(vec![example_quad()]).unwrap();
    let inserted = storage
        .insert_quads(vec![example_quad(), example_quad()])
        .unwrap();

    assert_eq!(inserted, 0);
    assert_eq!(storage.len().unwrap(), 1);
}

#[test]
fn insert_into_reserved_graph_fails() {
    let storage = MemQuadStorage::new();

    let result = storage.insert_quads(vec![
        example_quad(),
        example_quad_with(GraphName::NamedNode(arq::UNION_GRAPH.into_owned()), "o"),
    ]);

    assert!(matches!(result, Err(StorageError::InvalidQuad(_))));
    assert!(storage.is_empty().unwrap());
}

#[test]
fn remove_quad() {
    let storage = MemQuadStorage::new();
    storage
        .insert_quads(vec![example_quad(), example_quad_in_graph("g")])
        .unwrap();

    assert!(storage.remove(example_quad().as_ref()).unwrap());
    assert!(!storage.remove(example_quad().as_ref()).unwrap());
    assert_eq!(storage.len().unwrap(), 1);
}

#[test]
fn default_graph_pattern_only_matches_default_graph() {
    let storage = MemQuadStorage::new();
    storage
        .insert_quads(vec![example_quad(), example_quad_in_graph("g")])
        .unwrap();

    let explicit = storage
        .quads_for_pattern(Some(arq::DEFAULT_GRAPH), None, None, None)
        .unwrap();
    let generated = storage
        .quads_for_pattern(Some(arq::DEFAULT_GRAPH_GENERATED), None, None, None)
        .unwrap();

    assert_eq!(explicit, vec![example_quad()]);
    assert_eq!(explicit, generated);
}

#[test]
fn named_graph_pattern_only_matches_graph() {
    let storage = MemQuadStorage::new();
    storage
        .insert_quads(vec![
            example_quad(),
            example_quad_in_graph("g1"),
            example_quad_in_graph("g2"),
        ])
        .unwrap();

    let g1 = iri("g1");
    let result = storage
        .quads_for_pattern(Some(g1.as_ref()), None, None, None)
        .unwrap();

    assert_eq!(result, vec![example_quad_in_graph("g1")]);
}

#[test]
fn unbound_graph_matches_all_graphs() {
    let storage = MemQuadStorage::new();
    storage
        .insert_quads(vec![example_quad(), example_quad_in_graph("g1")])
        .unwrap();

    let result = storage.quads_for_pattern(None, None, None, None).unwrap();

    assert_eq!(result.len(), 2);
}

#[test]
fn union_graph_deduplicates_triples() {
    let storage = MemQuadStorage::new();
    storage
        .insert_quads(vec![
            example_quad(),
            example_quad_in_graph("g1"),
            example_quad_in_graph("g2"),
            example_quad_with(GraphName::NamedNode(iri("g2")), "other"),
        ])
        .unwrap();

    let result = storage
        .quads_for_pattern(Some(arq::UNION_GRAPH), None, None, None)
        .unwrap();

    assert_debug_snapshot!(result.iter().map(ToString::to_string).collect::<Vec<_>>(), @r#"
    [
        "<http://example.com/subject> <http://example.com/predicate> <http://example.com/object> <urn:x-arq:UnionGraph>",
        "<http://example.com/subject> <http://example.com/predicate> <http://example.com/other> <urn:x-arq:UnionGraph>",
    ]
    "#);
}

#[test]
fn pattern_filters_terms() {
    let storage = MemQuadStorage::new();
    storage
        .insert_quads(vec![
            example_quad(),
            example_quad_with(GraphName::DefaultGraph, "other"),
        ])
        .unwrap();

    let other = iri("other");
    let predicate = iri("predicate");
    let result = storage
        .quads_for_pattern(
            None,
            None,
            Some(predicate.as_ref()),
            Some(TermRef::NamedNode(other.as_ref())),
        )
        .unwrap();

    assert_eq!(
        result,
        vec![example_quad_with(GraphName::DefaultGraph, "other")]
    );
}

#[test]
fn graph_existence() {
    let storage = MemQuadStorage::new();
    storage
        .insert_quads(vec![example_quad_in_graph("g1"), example_quad_in_graph("g2")])
        .unwrap();

    assert!(storage.contains_graph(arq::DEFAULT_GRAPH).unwrap());
    assert!(storage.contains_graph(iri("g1").as_ref()).unwrap());
    assert!(!storage.contains_graph(iri("g3").as_ref()).unwrap());
    assert_eq!(
        storage.named_graphs().unwrap(),
        vec![
            NamedOrBlankNode::NamedNode(iri("g1")),
            NamedOrBlankNode::NamedNode(iri("g2"))
        ]
    );
}
