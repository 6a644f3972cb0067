mod simplify;
mod transformer;
mod walker;

pub use simplify::TransformSimplify;
pub use transformer::{transform, ApplyTransformVisitor, Transformer};
pub use walker::{walk, OpVisitor, Walker};

use crate::op::{Op, OpRef};
use rdf_fusion_common::AlgebraResult;
use std::sync::Arc;

/// Defines whether a [Transform] rebuilds operators whose inputs did not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CopyPolicy {
    /// Operators are only rebuilt if one of their inputs changed. Otherwise, the original
    /// operator is returned.
    #[default]
    OnChange,
    /// Every operator is rebuilt. Can be used for obtaining a deep copy of an operator tree.
    Always,
}

/// A bottom-up rewrite of an operator tree.
///
/// The [Transformer] calls exactly one handler per operator, depending on its
/// [shape](crate::OpShape). The handlers receive the original operator and its already
/// transformed inputs. The default handlers rebuild the operator according to the
/// [copy policy](Self::copy_policy).
pub trait Transform {
    /// Additional state that is maintained by the visitors that run before and after an operator
    /// is transformed (e.g., the current graph scope).
    type Context;

    /// A name for this transform, used for logging.
    fn name(&self) -> &str;

    fn copy_policy(&self) -> CopyPolicy {
        CopyPolicy::OnChange
    }

    fn transform_leaf(&mut self, op: &OpRef, _ctx: &Self::Context) -> AlgebraResult<OpRef> {
        Ok(copy_without_inputs(self.copy_policy(), op))
    }

    fn transform_unary(
        &mut self,
        op: &OpRef,
        inner: OpRef,
        _ctx: &Self::Context,
    ) -> AlgebraResult<OpRef> {
        rebuild(self.copy_policy(), op, vec![inner])
    }

    fn transform_binary(
        &mut self,
        op: &OpRef,
        left: OpRef,
        right: OpRef,
        _ctx: &Self::Context,
    ) -> AlgebraResult<OpRef> {
        rebuild(self.copy_policy(), op, vec![left, right])
    }

    fn transform_nary(
        &mut self,
        op: &OpRef,
        inputs: Vec<OpRef>,
        _ctx: &Self::Context,
    ) -> AlgebraResult<OpRef> {
        rebuild(self.copy_policy(), op, inputs)
    }

    fn transform_extension(&mut self, op: &OpRef, _ctx: &Self::Context) -> AlgebraResult<OpRef> {
        Ok(copy_without_inputs(self.copy_policy(), op))
    }
}

/// Rebuilds `op` with the new `inputs`.
///
/// With [CopyPolicy::OnChange], `op` itself is returned if every new input is the very same
/// operator as the original input.
pub fn rebuild(policy: CopyPolicy, op: &OpRef, inputs: Vec<OpRef>) -> AlgebraResult<OpRef> {
    if policy == CopyPolicy::OnChange {
        let original = op.inputs();
        let unchanged = original.len() == inputs.len()
            && original
                .iter()
                .zip(inputs.iter())
                .all(|(old, new)| Arc::ptr_eq(old, new));
        if unchanged {
            return Ok(Arc::clone(op));
        }
    }
    Ok(Arc::new(op.with_new_inputs(inputs)?))
}

fn copy_without_inputs(policy: CopyPolicy, op: &OpRef) -> OpRef {
    match policy {
        CopyPolicy::OnChange => Arc::clone(op),
        CopyPolicy::Always => Arc::new(Op::clone(op)),
    }
}

/// A transform that does not change the semantics of the tree. With [CopyPolicy::Always], it
/// produces a deep copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformCopy {
    policy: CopyPolicy,
}

impl TransformCopy {
    pub fn new(policy: CopyPolicy) -> Self {
        Self { policy }
    }
}

impl Transform for TransformCopy {
    type Context = ();

    fn name(&self) -> &str {
        "copy"
    }

    fn copy_policy(&self) -> CopyPolicy {
        self.policy
    }
}
