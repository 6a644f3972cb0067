use crate::op::{Op, OpRef};
use crate::transform::OpVisitor;
use rdf_fusion_common::error::AlgebraError;
use rdf_fusion_common::AlgebraResult;
use rdf_fusion_model::NamedNodePattern;

/// Tracks the graph that is active for the operator that is currently transformed.
///
/// The bottom of the stack holds the graph that is active outside of any `GRAPH` operator. It is
/// never removed. Every `GRAPH` operator pushes its graph name before its inputs are walked and
/// pops it after the operator itself has been transformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphScopeStack {
    scopes: Vec<NamedNodePattern>,
}

impl GraphScopeStack {
    /// Creates a new stack with `outermost` as the graph outside of any `GRAPH` operator.
    pub fn new(outermost: NamedNodePattern) -> Self {
        Self {
            scopes: vec![outermost],
        }
    }

    pub fn push(&mut self, graph: NamedNodePattern) {
        self.scopes.push(graph);
    }

    pub fn pop(&mut self) -> AlgebraResult<NamedNodePattern> {
        if self.scopes.len() <= 1 {
            return AlgebraError::internal("Cannot pop the outermost graph scope.");
        }
        self.scopes.pop().ok_or_else(|| {
            AlgebraError::InternalCompilerError(String::from("Graph scope stack is empty."))
        })
    }

    /// Returns the currently active graph.
    pub fn current(&self) -> AlgebraResult<&NamedNodePattern> {
        self.scopes.last().ok_or_else(|| {
            AlgebraError::InternalCompilerError(String::from("Graph scope stack is empty."))
        })
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Checks that every push has been matched by a pop.
    pub fn check_balanced(&self) -> AlgebraResult<()> {
        if self.scopes.len() != 1 {
            return AlgebraError::internal(format!(
                "Graph scope stack has depth {} after the transformation.",
                self.scopes.len()
            ));
        }
        Ok(())
    }
}

/// Enters the scope of a `GRAPH` operator.
#[derive(Debug, Default, Clone, Copy)]
pub struct PushGraphScope;

impl OpVisitor<GraphScopeStack> for PushGraphScope {
    fn visit(&mut self, op: &OpRef, ctx: &mut GraphScopeStack) -> AlgebraResult<()> {
        if let Op::Graph { name, .. } = op.as_ref() {
            ctx.push(name.clone());
        }
        Ok(())
    }
}

/// Leaves the scope of a `GRAPH` operator.
#[derive(Debug, Default, Clone, Copy)]
pub struct PopGraphScope;

impl OpVisitor<GraphScopeStack> for PopGraphScope {
    fn visit(&mut self, op: &OpRef, ctx: &mut GraphScopeStack) -> AlgebraResult<()> {
        if let Op::Graph { .. } = op.as_ref() {
            ctx.pop()?;
        }
        Ok(())
    }
}
