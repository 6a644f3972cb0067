use crate::op::{OpRef, OpShape};
use crate::transform::walker::{OpVisitor, Walker};
use crate::transform::Transform;
use rdf_fusion_common::error::AlgebraError;
use rdf_fusion_common::AlgebraResult;
use std::sync::Arc;

/// Applies a [Transform] to every operator visited by a [Walker].
///
/// Transformed operators are kept on a result stack. Visiting an operator pops the transformed
/// versions of its inputs and pushes the transformed operator. After the walk, the stack must
/// contain exactly one operator: the transformed root.
pub struct ApplyTransformVisitor<'t, T: Transform> {
    transform: &'t mut T,
    stack: Vec<OpRef>,
}

impl<'t, T: Transform> ApplyTransformVisitor<'t, T> {
    pub fn new(transform: &'t mut T) -> Self {
        Self {
            transform,
            stack: Vec::new(),
        }
    }

    /// Returns the transformed root operator.
    pub fn into_result(mut self) -> AlgebraResult<OpRef> {
        if self.stack.len() != 1 {
            return AlgebraError::internal(format!(
                "Transform result stack contains {} operators after the walk.",
                self.stack.len()
            ));
        }
        self.pop()
    }

    fn pop(&mut self) -> AlgebraResult<OpRef> {
        self.stack.pop().ok_or_else(|| {
            AlgebraError::InternalCompilerError(String::from("Transform result stack is empty."))
        })
    }

    fn pop_many(&mut self, count: usize) -> AlgebraResult<Vec<OpRef>> {
        if self.stack.len() < count {
            return AlgebraError::internal(format!(
                "Transform result stack contains {} operators but {count} were requested.",
                self.stack.len()
            ));
        }
        Ok(self.stack.split_off(self.stack.len() - count))
    }
}

impl<T: Transform> OpVisitor<T::Context> for ApplyTransformVisitor<'_, T> {
    fn visit(&mut self, op: &OpRef, ctx: &mut T::Context) -> AlgebraResult<()> {
        let ctx = &*ctx;
        let result = match op.shape() {
            OpShape::Leaf => self.transform.transform_leaf(op, ctx)?,
            OpShape::Extension => self.transform.transform_extension(op, ctx)?,
            OpShape::Unary => {
                let inner = self.pop()?;
                self.transform.transform_unary(op, inner, ctx)?
            }
            OpShape::Binary => {
                let right = self.pop()?;
                let left = self.pop()?;
                self.transform.transform_binary(op, left, right, ctx)?
            }
            OpShape::Nary => {
                let inputs = self.pop_many(op.inputs().len())?;
                self.transform.transform_nary(op, inputs, ctx)?
            }
        };
        self.stack.push(result);
        Ok(())
    }

    fn visit_skipped(&mut self, op: &OpRef, _ctx: &mut T::Context) -> AlgebraResult<()> {
        self.stack.push(Arc::clone(op));
        Ok(())
    }
}

/// Configures how a [Transform] is applied to an operator tree.
pub struct Transformer<'v, C> {
    walker: Walker<'v, C>,
}

impl<C> Default for Transformer<'_, C> {
    fn default() -> Self {
        Self {
            walker: Walker::new(),
        }
    }
}

impl<'v, C> Transformer<'v, C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a visitor that is called before an operator and its inputs are transformed.
    #[must_use]
    pub fn with_before(mut self, visitor: &'v mut dyn OpVisitor<C>) -> Self {
        self.walker = self.walker.with_before(visitor);
        self
    }

    /// Sets a visitor that is called after an operator has been transformed.
    #[must_use]
    pub fn with_after(mut self, visitor: &'v mut dyn OpVisitor<C>) -> Self {
        self.walker = self.walker.with_after(visitor);
        self
    }

    /// Leaves `SERVICE` operators, including their contents, untouched.
    #[must_use]
    pub fn skip_service(mut self, skip_service: bool) -> Self {
        self.walker = self.walker.skip_service(skip_service);
        self
    }

    pub fn transform<T: Transform<Context = C>>(
        mut self,
        transform: &mut T,
        op: &OpRef,
        ctx: &mut C,
    ) -> AlgebraResult<OpRef> {
        tracing::trace!(transform = transform.name(), "Applying transform");
        let mut visitor = ApplyTransformVisitor::new(transform);
        self.walker.walk(op, &mut visitor, ctx)?;
        visitor.into_result()
    }
}

/// Applies a context-free `transform` to `op`.
pub fn transform<T: Transform<Context = ()>>(transform: &mut T, op: &OpRef) -> AlgebraResult<OpRef> {
    Transformer::new().transform(transform, op, &mut ())
}
