use rdf_fusion_logical::{Op, OpRef};
use rdf_fusion_model::{NamedNode, NamedNodePattern, TermPattern, TriplePattern, Variable};

pub fn var(name: &str) -> Variable {
    Variable::new_unchecked(name)
}

pub fn graph_var(name: &str) -> NamedNodePattern {
    NamedNodePattern::Variable(var(name))
}

pub fn graph_iri(iri: &str) -> NamedNodePattern {
    NamedNodePattern::NamedNode(NamedNode::new_unchecked(iri))
}

/// Creates the triple pattern `?s <http://example.com/{p}> ?o`.
pub fn triple(s: &str, p: &str, o: &str) -> TriplePattern {
    TriplePattern {
        subject: TermPattern::Variable(var(s)),
        predicate: NamedNodePattern::NamedNode(NamedNode::new_unchecked(format!(
            "http://example.com/{p}"
        ))),
        object: TermPattern::Variable(var(o)),
    }
}

pub fn bgp(patterns: &[(&str, &str, &str)]) -> OpRef {
    Op::bgp(
        patterns
            .iter()
            .map(|(s, p, o)| triple(s, p, o))
            .collect(),
    )
}
