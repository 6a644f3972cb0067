use crate::test_utils::{bgp, graph_iri, graph_var, var};
use rdf_fusion_common::AlgebraResult;
use rdf_fusion_logical::quads::{GraphScopeStack, PopGraphScope, PushGraphScope};
use rdf_fusion_logical::transform::{OpVisitor, Transform, Transformer};
use rdf_fusion_logical::{Op, OpRef};
use rdf_fusion_model::{default_graph_generated, Expression, NamedNodePattern};
use std::sync::Arc;

/// Records the active graph for every transformed basic graph pattern.
#[derive(Default)]
struct RecordActiveGraph {
    graphs: Vec<NamedNodePattern>,
}

impl Transform for RecordActiveGraph {
    type Context = GraphScopeStack;

    fn name(&self) -> &str {
        "record-active-graph"
    }

    fn transform_leaf(&mut self, op: &OpRef, ctx: &GraphScopeStack) -> AlgebraResult<OpRef> {
        if let Op::Bgp { .. } = op.as_ref() {
            self.graphs.push(ctx.current()?.clone());
        }
        Ok(Arc::clone(op))
    }
}

/// Counts how often a visitor was called for a `GRAPH` operator.
#[derive(Default)]
struct CountGraphs {
    count: usize,
}

impl OpVisitor<GraphScopeStack> for CountGraphs {
    fn visit(&mut self, op: &OpRef, _ctx: &mut GraphScopeStack) -> AlgebraResult<()> {
        if let Op::Graph { .. } = op.as_ref() {
            self.count += 1;
        }
        Ok(())
    }
}

/// Pushes the graph scope and counts the visited `GRAPH` operators.
#[derive(Default)]
struct CountingPush {
    inner: CountGraphs,
}

impl OpVisitor<GraphScopeStack> for CountingPush {
    fn visit(&mut self, op: &OpRef, ctx: &mut GraphScopeStack) -> AlgebraResult<()> {
        self.inner.visit(op, ctx)?;
        PushGraphScope.visit(op, ctx)
    }
}

/// Pops the graph scope and counts the visited `GRAPH` operators.
#[derive(Default)]
struct CountingPop {
    inner: CountGraphs,
}

impl OpVisitor<GraphScopeStack> for CountingPop {
    fn visit(&mut self, op: &OpRef, ctx: &mut GraphScopeStack) -> AlgebraResult<()> {
        self.inner.visit(op, ctx)?;
        PopGraphScope.visit(op, ctx)
    }
}

#[test]
fn graph_scope_follows_nesting() {
    let op = Op::sequence(vec![
        bgp(&[("a", "p", "b")]),
        Op::graph(
            graph_var("g1"),
            Op::join(
                bgp(&[("c", "p", "d")]),
                Op::graph(graph_iri("http://example.com/g2"), bgp(&[("e", "p", "f")])),
            ),
        ),
        bgp(&[("g", "p", "h")]),
    ]);

    let mut record = RecordActiveGraph::default();
    let mut push = CountingPush::default();
    let mut pop = CountingPop::default();
    let mut scopes = GraphScopeStack::new(default_graph_generated());
    let result = Transformer::new()
        .with_before(&mut push)
        .with_after(&mut pop)
        .transform(&mut record, &op, &mut scopes)
        .unwrap();

    assert!(Arc::ptr_eq(&op, &result));
    assert_eq!(
        record.graphs,
        vec![
            default_graph_generated(),
            graph_var("g1"),
            graph_iri("http://example.com/g2"),
            default_graph_generated(),
        ]
    );
    assert_eq!(push.inner.count, 2);
    assert_eq!(pop.inner.count, 2);
    assert!(scopes.check_balanced().is_ok());
}

/// A transform that replaces every basic graph pattern with the same, new, pattern.
struct ReplaceBgp;

impl Transform for ReplaceBgp {
    type Context = ();

    fn name(&self) -> &str {
        "replace-bgp"
    }

    fn transform_leaf(&mut self, op: &OpRef, _ctx: &()) -> AlgebraResult<OpRef> {
        match op.as_ref() {
            Op::Bgp { .. } => Ok(bgp(&[("x", "replaced", "y")])),
            _ => Ok(Arc::clone(op)),
        }
    }
}

#[test]
fn copy_on_change_only_rebuilds_changed_path() {
    let untouched = Op::join(Op::unit(), Arc::new(Op::Null));
    let op = Op::union(
        Arc::clone(&untouched),
        Op::filter(
            vec![Expression::Bound(var("s"))],
            bgp(&[("s", "p", "o")]),
        ),
    );

    let result = rdf_fusion_logical::transform::transform(&mut ReplaceBgp, &op).unwrap();

    assert!(!Arc::ptr_eq(&op, &result));
    assert!(Arc::ptr_eq(result.inputs()[0], &untouched));
    insta::assert_snapshot!(result.inputs()[1], @r"
    Filter: BOUND(?s)
      Bgp (?x <http://example.com/replaced> ?y)
    ");
}
