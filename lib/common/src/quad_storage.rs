use crate::error::StorageError;
use rdf_fusion_model::{NamedNodeRef, NamedOrBlankNode, Quad, TermRef};
use std::fmt::Debug;

/// The storage of a dataset (i.e., a default graph and a set of named graphs) that resolves quad
/// patterns.
///
/// # Quad Resolution
///
/// The graph component of a pattern is resolved as follows:
/// - `None` matches quads in the default graph and in every named graph. Each quad keeps its
///   originating graph.
/// - [arq::DEFAULT_GRAPH](rdf_fusion_model::vocab::arq::DEFAULT_GRAPH) and
///   [arq::DEFAULT_GRAPH_GENERATED](rdf_fusion_model::vocab::arq::DEFAULT_GRAPH_GENERATED) match
///   the triples of the default graph.
/// - [arq::UNION_GRAPH](rdf_fusion_model::vocab::arq::UNION_GRAPH) matches the triples of all
///   named graphs. The graph component of the results is set to the union graph and each triple
///   is returned only once, even if it is contained in multiple named graphs.
/// - Any other IRI matches only the quads stored in exactly that graph.
pub trait QuadStorage: Debug + Send + Sync {
    /// Returns all quads that match the given pattern. `None` acts as a wildcard.
    fn quads_for_pattern(
        &self,
        graph: Option<NamedNodeRef<'_>>,
        subject: Option<TermRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
    ) -> Result<Vec<Quad>, StorageError>;

    /// Returns the list of named graphs that currently hold at least one quad.
    fn named_graphs(&self) -> Result<Vec<NamedOrBlankNode>, StorageError>;

    /// Returns whether `graph` currently exists.
    ///
    /// The default graph (in both of its reserved forms) always exists. A named graph exists if
    /// it contains at least one quad. The union graph exists if any named graph exists.
    fn contains_graph(&self, graph: NamedNodeRef<'_>) -> Result<bool, StorageError>;

    /// Returns the number of quads in the storage.
    fn len(&self) -> Result<usize, StorageError>;

    /// Returns whether the storage contains no quads.
    fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}
