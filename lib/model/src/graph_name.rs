use crate::vocab::arq;
use spargebra::term::NamedNodePattern;

/// Returns `true` if `graph` names the default graph, either explicitly or in its generated
/// form.
pub fn is_default_graph(graph: &NamedNodePattern) -> bool {
    match graph {
        NamedNodePattern::NamedNode(nn) => {
            nn.as_ref() == arq::DEFAULT_GRAPH || nn.as_ref() == arq::DEFAULT_GRAPH_GENERATED
        }
        NamedNodePattern::Variable(_) => false,
    }
}

/// Returns `true` if `graph` names the virtual union graph.
pub fn is_union_graph(graph: &NamedNodePattern) -> bool {
    match graph {
        NamedNodePattern::NamedNode(nn) => nn.as_ref() == arq::UNION_GRAPH,
        NamedNodePattern::Variable(_) => false,
    }
}

/// The graph name that quadization starts with.
pub fn default_graph_generated() -> NamedNodePattern {
    NamedNodePattern::NamedNode(arq::DEFAULT_GRAPH_GENERATED.into_owned())
}
