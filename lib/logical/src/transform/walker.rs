use crate::op::{Op, OpRef};
use rdf_fusion_common::AlgebraResult;

/// A callback that is invoked for operators during a walk of the operator tree.
pub trait OpVisitor<C> {
    fn visit(&mut self, op: &OpRef, ctx: &mut C) -> AlgebraResult<()>;

    /// Called instead of [Self::visit] for operators whose inputs were not walked (i.e., a
    /// `SERVICE` operator if the walker skips services).
    fn visit_skipped(&mut self, _op: &OpRef, _ctx: &mut C) -> AlgebraResult<()> {
        Ok(())
    }
}

/// Walks an operator tree bottom-up.
///
/// For each operator, the walker calls the *before* visitor, walks the inputs from left to
/// right, calls the main visitor, and finally calls the *after* visitor. The before and after
/// visitors can be used for maintaining scoped state in the context (e.g., the active graph).
pub struct Walker<'v, C> {
    before: Option<&'v mut dyn OpVisitor<C>>,
    after: Option<&'v mut dyn OpVisitor<C>>,
    skip_service: bool,
}

impl<'v, C> Default for Walker<'v, C> {
    fn default() -> Self {
        Self {
            before: None,
            after: None,
            skip_service: false,
        }
    }
}

impl<'v, C> Walker<'v, C> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_before(mut self, visitor: &'v mut dyn OpVisitor<C>) -> Self {
        self.before = Some(visitor);
        self
    }

    #[must_use]
    pub fn with_after(mut self, visitor: &'v mut dyn OpVisitor<C>) -> Self {
        self.after = Some(visitor);
        self
    }

    /// Do not descend into `SERVICE` operators. The contents of a service are evaluated remotely.
    #[must_use]
    pub fn skip_service(mut self, skip_service: bool) -> Self {
        self.skip_service = skip_service;
        self
    }

    pub fn walk(
        &mut self,
        op: &OpRef,
        visitor: &mut dyn OpVisitor<C>,
        ctx: &mut C,
    ) -> AlgebraResult<()> {
        if let Some(before) = self.before.as_deref_mut() {
            before.visit(op, ctx)?;
        }

        if self.skip_service && matches!(op.as_ref(), Op::Service { .. }) {
            visitor.visit_skipped(op, ctx)?;
        } else {
            for input in op.inputs() {
                self.walk(input, visitor, ctx)?;
            }
            visitor.visit(op, ctx)?;
        }

        if let Some(after) = self.after.as_deref_mut() {
            after.visit(op, ctx)?;
        }
        Ok(())
    }
}

/// Walks `op` with a single visitor and no before or after visitors.
pub fn walk<C>(op: &OpRef, visitor: &mut dyn OpVisitor<C>, ctx: &mut C) -> AlgebraResult<()> {
    Walker::new().walk(op, visitor, ctx)
}
