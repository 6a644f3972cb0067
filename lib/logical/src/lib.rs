//! The SPARQL algebra: an immutable operator tree and the machinery for rewriting it.

mod extension;
mod op;
pub mod quads;
pub mod transform;
pub mod union_graph;

pub use extension::{
    ExtensionBuilder, ExtensionBuilderRef, ExtensionRegistry, OpaqueExtensionBuilder,
};
pub use op::{
    Op, OpExtension, OpRef, OpShape, PropFuncArg, Table, TriplePath, VarExprList,
};
