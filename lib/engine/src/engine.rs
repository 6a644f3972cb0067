use crate::config::AlgebraConfig;
use crate::sparql::error::EvaluationError;
use crate::sparql::{evaluate, AlgebraGenerator, OpAsQuery, Query, Solution};
use rdf_fusion_common::{AlgebraResult, QuadStorage};
use rdf_fusion_logical::quads::quadize;
use rdf_fusion_logical::union_graph::rewrite_union_default_graph;
use rdf_fusion_logical::{ExtensionRegistry, OpRef};
use std::sync::Arc;

/// Represents an instance of the algebra pipeline.
///
/// An engine consists of:
/// - An [AlgebraConfig] that controls which rewrites are applied to generated operator trees.
/// - An [ExtensionRegistry] that is shared by the generator and the reverse compiler.
#[derive(Debug, Clone, Default)]
pub struct AlgebraEngine {
    config: AlgebraConfig,
    registry: Arc<ExtensionRegistry>,
}

impl AlgebraEngine {
    /// Creates a new [AlgebraEngine] without any extensions.
    pub fn new(config: AlgebraConfig) -> Self {
        Self::with_registry(config, Arc::new(ExtensionRegistry::new()))
    }

    pub fn with_registry(config: AlgebraConfig, registry: Arc<ExtensionRegistry>) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &AlgebraConfig {
        &self.config
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        self.registry.as_ref()
    }

    /// Compiles `query` into an operator tree and applies the configured rewrites.
    ///
    /// The union/default-graph rewrite runs before quadization, so that quadization already sees
    /// the graph scopes that the rewrite introduces.
    pub fn compile(&self, query: &Query) -> AlgebraResult<OpRef> {
        let generator = AlgebraGenerator::new(self.config.clone(), Arc::clone(&self.registry));
        let mut op = generator.compile(query)?;

        if self.config.union_default_graph {
            op = rewrite_union_default_graph(&op)?;
            tracing::debug!("Rewritten for union default graph:\n{op}");
        }

        if self.config.quad_form {
            op = quadize(&op)?;
            tracing::debug!("Quadized:\n{op}");
        }

        Ok(op)
    }

    /// Converts an operator tree back into a query.
    pub fn to_query(&self, op: &OpRef) -> AlgebraResult<Query> {
        OpAsQuery::new(&self.registry).convert(op)
    }

    /// Compiles `query` and evaluates the result against `storage` with the reference evaluator.
    pub fn evaluate(
        &self,
        query: &Query,
        storage: &dyn QuadStorage,
    ) -> Result<Vec<Solution>, EvaluationError> {
        let op = self.compile(query)?;
        evaluate(&op, storage)
    }
}
