use crate::op::{Op, OpRef};
use crate::quads::{GraphScopeStack, PopGraphScope, PushGraphScope};
use crate::transform::{rebuild, Transform, Transformer};
use rdf_fusion_common::AlgebraResult;
use rdf_fusion_model::default_graph_generated;
use std::sync::Arc;

/// Pushes `GRAPH` operators into the patterns below them.
///
/// - A non-empty basic graph pattern becomes a quad pattern for the active graph.
/// - Paths and property functions cannot carry a graph. They are wrapped in a `GRAPH` operator
///   for the active graph instead.
/// - A `GRAPH` operator is removed. If its (transformed) input is empty, it is replaced by a
///   [DatasetNames](Op::DatasetNames) operator such that `GRAPH ?g {}` still enumerates the
///   graph names.
///
/// `SERVICE` operators must be skipped, as their contents are evaluated remotely. [quadize]
/// takes care of this.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuadizationTransform;

impl Transform for QuadizationTransform {
    type Context = GraphScopeStack;

    fn name(&self) -> &str {
        "quadization"
    }

    fn transform_leaf(&mut self, op: &OpRef, ctx: &GraphScopeStack) -> AlgebraResult<OpRef> {
        let result = match op.as_ref() {
            Op::Bgp { patterns } if !patterns.is_empty() => Arc::new(Op::QuadPattern {
                graph: ctx.current()?.clone(),
                patterns: patterns.clone(),
            }),
            Op::Path { .. } => Op::graph(ctx.current()?.clone(), Arc::clone(op)),
            _ => Arc::clone(op),
        };
        Ok(result)
    }

    fn transform_unary(
        &mut self,
        op: &OpRef,
        inner: OpRef,
        ctx: &GraphScopeStack,
    ) -> AlgebraResult<OpRef> {
        match op.as_ref() {
            Op::Graph { name, .. } => {
                if is_empty_pattern(&inner) {
                    Ok(Arc::new(Op::DatasetNames {
                        graph: name.clone(),
                    }))
                } else {
                    Ok(inner)
                }
            }
            Op::PropFunc { .. } => {
                let op = rebuild(self.copy_policy(), op, vec![inner])?;
                Ok(Op::graph(ctx.current()?.clone(), op))
            }
            _ => rebuild(self.copy_policy(), op, vec![inner]),
        }
    }
}

fn is_empty_pattern(op: &Op) -> bool {
    match op {
        Op::Bgp { patterns } | Op::QuadPattern { patterns, .. } => patterns.is_empty(),
        Op::Table { table } => table.is_join_identity(),
        _ => false,
    }
}

/// Converts `op` into quad form. Patterns outside of any `GRAPH` operator are assigned to the
/// [generated default graph](rdf_fusion_model::vocab::arq::DEFAULT_GRAPH_GENERATED).
pub fn quadize(op: &OpRef) -> AlgebraResult<OpRef> {
    let mut scopes = GraphScopeStack::new(default_graph_generated());
    let mut push = PushGraphScope;
    let mut pop = PopGraphScope;

    let result = Transformer::new()
        .with_before(&mut push)
        .with_after(&mut pop)
        .skip_service(true)
        .transform(&mut QuadizationTransform, op, &mut scopes)?;
    scopes.check_balanced()?;

    tracing::trace!("Quadized operator tree:\n{result}");
    Ok(result)
}
