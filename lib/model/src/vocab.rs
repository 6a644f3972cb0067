//! Reserved IRIs used by the algebra layer.

/// Graph names with a special meaning during quadization and quad resolution.
///
/// These IRIs never occur in user data. A storage layer that receives one of them as the graph
/// component of a quad pattern must resolve it according to the quad resolution model.
pub mod arq {
    use oxrdf::NamedNodeRef;

    /// The graph that holds all triples that are not part of a named graph.
    pub const DEFAULT_GRAPH: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("urn:x-arq:DefaultGraph");

    /// The default graph as introduced by quadization. The dataset resolves it to
    /// [DEFAULT_GRAPH].
    pub const DEFAULT_GRAPH_GENERATED: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("urn:x-arq:DefaultGraphNode");

    /// A virtual graph that contains the union of all named graphs. Triples are deduplicated
    /// across graphs.
    pub const UNION_GRAPH: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("urn:x-arq:UnionGraph");
}
