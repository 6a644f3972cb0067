use crate::op::{Op, OpRef};
use crate::transform::{rebuild, Transform};
use rdf_fusion_common::AlgebraResult;

/// Removes join identities (the unit table) from joins.
///
/// The algebra generator starts every group with the unit table. Hence, joins with the unit
/// table are very common in freshly generated operator trees.
#[derive(Debug, Default, Clone, Copy)]
pub struct TransformSimplify;

impl Transform for TransformSimplify {
    type Context = ();

    fn name(&self) -> &str {
        "simplify"
    }

    fn transform_binary(
        &mut self,
        op: &OpRef,
        left: OpRef,
        right: OpRef,
        _ctx: &Self::Context,
    ) -> AlgebraResult<OpRef> {
        if matches!(op.as_ref(), Op::Join { .. }) {
            if left.is_join_identity() {
                return Ok(right);
            }
            if right.is_join_identity() {
                return Ok(left);
            }
        }
        rebuild(self.copy_policy(), op, vec![left, right])
    }
}
