use rdf_fusion_engine::sparql::{Element, Query};
use rdf_fusion_model::{
    Expression, GraphName, NamedNode, NamedNodePattern, NamedOrBlankNode, Quad, Term,
    TermPattern, TriplePattern, Variable,
};
use rdf_fusion_storage::memory::MemQuadStorage;

pub fn var(name: &str) -> Variable {
    Variable::new_unchecked(name)
}

pub fn iri(suffix: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.com/{suffix}"))
}

pub fn bound(name: &str) -> Expression {
    Expression::Bound(var(name))
}

/// Creates a block with the triple pattern `?s <http://example.com/{p}> ?o`.
pub fn triples(s: &str, p: &str, o: &str) -> Element {
    Element::Triples(vec![TriplePattern {
        subject: TermPattern::Variable(var(s)),
        predicate: NamedNodePattern::NamedNode(iri(p)),
        object: TermPattern::Variable(var(o)),
    }])
}

pub fn named_graph(name: NamedNodePattern, elements: Vec<Element>) -> Element {
    Element::NamedGraph {
        name,
        inner: Box::new(Element::Group(elements)),
    }
}

/// Creates a `SELECT` query that projects `variables`.
pub fn select(variables: &[&str], pattern: Element) -> Query {
    let mut query = Query::new(pattern);
    query.result_star = false;
    query.project = variables.iter().map(|v| (var(v), None)).collect();
    query
}

pub fn quad(s: &str, p: &str, o: &str, graph: Option<&str>) -> Quad {
    Quad::new(
        NamedOrBlankNode::NamedNode(iri(s)),
        iri(p),
        Term::NamedNode(iri(o)),
        graph.map_or(GraphName::DefaultGraph, |g| GraphName::NamedNode(iri(g))),
    )
}

/// A dataset that contains the same triple in two named graphs and another triple in the
/// default graph.
pub fn example_storage() -> MemQuadStorage {
    let storage = MemQuadStorage::new();
    storage
        .insert_quads(vec![
            quad("alice", "knows", "bob", Some("g1")),
            quad("alice", "knows", "bob", Some("g2")),
            quad("alice", "knows", "carol", None),
        ])
        .unwrap();
    storage
}
