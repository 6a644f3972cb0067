use crate::op::{Op, OpRef};
use crate::quads::{GraphScopeStack, PopGraphScope, PushGraphScope};
use crate::transform::{rebuild, Transform, Transformer};
use itertools::Itertools;
use rdf_fusion_common::AlgebraResult;
use rdf_fusion_model::{
    default_graph_generated, is_default_graph, is_union_graph, NamedNodePattern, TermPattern,
    TriplePattern, VarAlloc, Variable,
};
use std::sync::Arc;

/// Prefix of the graph variables introduced by [UnionDefaultGraphTransform]. The prefix is not a
/// valid SPARQL variable name and, therefore, cannot clash with user variables.
const GRAPH_VARIABLE_PREFIX: &str = "*g";

/// Treats the default graph as the union of all named graphs.
///
/// Patterns that are matched against the default graph (or explicitly against the union graph)
/// are matched against every named graph instead:
///
/// ```text
/// Bgp(T)  =>  Distinct(Project(vars(T), Graph(?fresh, Bgp(T))))
/// ```
///
/// The projection removes the fresh graph variable, such that a triple that is contained in
/// multiple named graphs only produces a single solution. `GRAPH` operators that explicitly
/// select the union graph or the default graph are removed. Property paths are redirected in
/// the same way.
#[derive(Debug)]
pub struct UnionDefaultGraphTransform {
    var_alloc: VarAlloc,
}

impl Default for UnionDefaultGraphTransform {
    fn default() -> Self {
        Self {
            var_alloc: VarAlloc::new(GRAPH_VARIABLE_PREFIX),
        }
    }
}

impl UnionDefaultGraphTransform {
    pub fn new() -> Self {
        Self::default()
    }

    fn match_any_named_graph(&mut self, patterns: &[TriplePattern]) -> OpRef {
        self.in_any_named_graph(pattern_variables(patterns), Op::bgp(patterns.to_vec()))
    }

    fn in_any_named_graph(&mut self, variables: Vec<Variable>, op: OpRef) -> OpRef {
        let graph = NamedNodePattern::Variable(self.var_alloc.allocate());
        let inner = Op::graph(graph, op);
        Arc::new(Op::Distinct {
            inner: Arc::new(Op::Project { variables, inner }),
        })
    }
}

impl Transform for UnionDefaultGraphTransform {
    type Context = GraphScopeStack;

    fn name(&self) -> &str {
        "union-default-graph"
    }

    fn transform_leaf(&mut self, op: &OpRef, ctx: &GraphScopeStack) -> AlgebraResult<OpRef> {
        let current = ctx.current()?;
        let result = match op.as_ref() {
            Op::QuadPattern { graph, patterns } if is_default_or_union(graph) => {
                self.match_any_named_graph(patterns)
            }
            Op::Bgp { patterns } if !patterns.is_empty() && is_default_or_union(current) => {
                self.match_any_named_graph(patterns)
            }
            Op::Path { path } if is_default_or_union(current) => {
                let variables = [&path.subject, &path.object]
                    .into_iter()
                    .filter_map(term_variable)
                    .unique()
                    .cloned()
                    .collect();
                self.in_any_named_graph(variables, Arc::clone(op))
            }
            _ => Arc::clone(op),
        };
        Ok(result)
    }

    fn transform_unary(
        &mut self,
        op: &OpRef,
        inner: OpRef,
        _ctx: &GraphScopeStack,
    ) -> AlgebraResult<OpRef> {
        match op.as_ref() {
            // The content of the scope now matches the named graphs itself.
            Op::Graph { name, .. } if is_default_or_union(name) => Ok(inner),
            _ => rebuild(self.copy_policy(), op, vec![inner]),
        }
    }
}

fn is_default_or_union(graph: &NamedNodePattern) -> bool {
    is_default_graph(graph) || is_union_graph(graph)
}

/// Returns the variables of `patterns` in the order of their first occurrence.
fn pattern_variables(patterns: &[TriplePattern]) -> Vec<Variable> {
    patterns
        .iter()
        .flat_map(|pattern| {
            [
                term_variable(&pattern.subject),
                match &pattern.predicate {
                    NamedNodePattern::Variable(variable) => Some(variable),
                    NamedNodePattern::NamedNode(_) => None,
                },
                term_variable(&pattern.object),
            ]
        })
        .flatten()
        .unique()
        .cloned()
        .collect()
}

fn term_variable(term: &TermPattern) -> Option<&Variable> {
    match term {
        TermPattern::Variable(variable) => Some(variable),
        _ => None,
    }
}

/// Applies [UnionDefaultGraphTransform] to `op`. Works on operator trees with and without quad
/// form.
pub fn rewrite_union_default_graph(op: &OpRef) -> AlgebraResult<OpRef> {
    let mut scopes = GraphScopeStack::new(default_graph_generated());
    let mut push = PushGraphScope;
    let mut pop = PopGraphScope;

    let result = Transformer::new()
        .with_before(&mut push)
        .with_after(&mut pop)
        .skip_service(true)
        .transform(&mut UnionDefaultGraphTransform::new(), op, &mut scopes)?;
    scopes.check_balanced()?;

    tracing::trace!("Operator tree with union default graph:\n{result}");
    Ok(result)
}
