use rdf_fusion_common::error::StorageError;
use rdf_fusion_common::QuadStorage;
use rdf_fusion_model::vocab::arq;
use rdf_fusion_model::{
    GraphName, GraphNameRef, NamedNodeRef, NamedOrBlankNode, Quad, QuadRef, TermRef, Triple,
};
use rustc_hash::FxHashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A memory-based quad storage.
///
/// Quads are kept in insertion order. Inserting a quad that is already contained in the storage
/// has no effect.
#[derive(Debug, Default)]
pub struct MemQuadStorage {
    content: RwLock<MemContent>,
}

#[derive(Debug, Default)]
struct MemContent {
    quads: Vec<Quad>,
    index: FxHashSet<Quad>,
}

impl MemQuadStorage {
    /// Creates a new empty [MemQuadStorage].
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `quads` and returns the number of quads that were not already contained.
    ///
    /// Quads in one of the reserved `urn:x-arq:` graphs are rejected. In this case, no quad is
    /// inserted.
    pub fn insert_quads(&self, quads: Vec<Quad>) -> Result<usize, StorageError> {
        if let Some(quad) = quads.iter().find(|quad| is_reserved_graph(&quad.graph_name)) {
            return Err(StorageError::InvalidQuad(format!(
                "{} is a reserved graph name.",
                quad.graph_name
            )));
        }

        let mut content = self.write()?;
        let mut inserted = 0;
        for quad in quads {
            if content.index.insert(quad.clone()) {
                content.quads.push(quad);
                inserted += 1;
            }
        }
        tracing::trace!(inserted, "Inserted quads into memory storage");
        Ok(inserted)
    }

    /// Removes `quad` and returns whether it was contained.
    pub fn remove(&self, quad: QuadRef<'_>) -> Result<bool, StorageError> {
        let quad = quad.into_owned();
        let mut content = self.write()?;
        if !content.index.remove(&quad) {
            return Ok(false);
        }
        content.quads.retain(|q| q != &quad);
        Ok(true)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemContent>, StorageError> {
        self.content
            .read()
            .map_err(|_| StorageError::Other("Memory storage lock is poisoned.".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemContent>, StorageError> {
        self.content
            .write()
            .map_err(|_| StorageError::Other("Memory storage lock is poisoned.".into()))
    }
}

fn is_reserved_graph(graph: &GraphName) -> bool {
    match graph {
        GraphName::NamedNode(node) => {
            let node = node.as_ref();
            node == arq::DEFAULT_GRAPH
                || node == arq::DEFAULT_GRAPH_GENERATED
                || node == arq::UNION_GRAPH
        }
        GraphName::BlankNode(_) | GraphName::DefaultGraph => false,
    }
}

impl QuadStorage for MemQuadStorage {
    fn quads_for_pattern(
        &self,
        graph: Option<NamedNodeRef<'_>>,
        subject: Option<TermRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
    ) -> Result<Vec<Quad>, StorageError> {
        let content = self.read()?;
        let matching_triples = content.quads.iter().filter(|quad| {
            subject.map_or(true, |s| TermRef::from(quad.subject.as_ref()) == s)
                && predicate.map_or(true, |p| quad.predicate.as_ref() == p)
                && object.map_or(true, |o| quad.object.as_ref() == o)
        });

        let result = match graph {
            None => matching_triples.cloned().collect(),
            Some(graph) if graph == arq::DEFAULT_GRAPH || graph == arq::DEFAULT_GRAPH_GENERATED => {
                matching_triples
                    .filter(|quad| quad.graph_name.is_default_graph())
                    .cloned()
                    .collect()
            }
            Some(graph) if graph == arq::UNION_GRAPH => {
                let mut seen = FxHashSet::default();
                matching_triples
                    .filter(|quad| !quad.graph_name.is_default_graph())
                    .map(|quad| Triple::from(quad.clone()))
                    .filter(|triple| seen.insert(triple.clone()))
                    .map(|triple| triple.in_graph(arq::UNION_GRAPH.into_owned()))
                    .collect()
            }
            Some(graph) => matching_triples
                .filter(|quad| quad.graph_name.as_ref() == GraphNameRef::NamedNode(graph))
                .cloned()
                .collect(),
        };
        Ok(result)
    }

    fn named_graphs(&self) -> Result<Vec<NamedOrBlankNode>, StorageError> {
        let content = self.read()?;
        let mut seen = FxHashSet::default();
        let mut graphs = Vec::new();
        for quad in &content.quads {
            let graph = match &quad.graph_name {
                GraphName::NamedNode(node) => NamedOrBlankNode::NamedNode(node.clone()),
                GraphName::BlankNode(node) => NamedOrBlankNode::BlankNode(node.clone()),
                GraphName::DefaultGraph => continue,
            };
            if seen.insert(graph.clone()) {
                graphs.push(graph);
            }
        }
        Ok(graphs)
    }

    fn contains_graph(&self, graph: NamedNodeRef<'_>) -> Result<bool, StorageError> {
        if graph == arq::DEFAULT_GRAPH || graph == arq::DEFAULT_GRAPH_GENERATED {
            return Ok(true);
        }
        if graph == arq::UNION_GRAPH {
            return Ok(self
                .read()?
                .quads
                .iter()
                .any(|quad| !quad.graph_name.is_default_graph()));
        }
        Ok(self
            .read()?
            .quads
            .iter()
            .any(|quad| quad.graph_name.as_ref() == GraphNameRef::NamedNode(graph)))
    }

    fn len(&self) -> Result<usize, StorageError> {
        Ok(self.read()?.quads.len())
    }
}
