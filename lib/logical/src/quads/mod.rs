//! Converts operator trees into quad form.
//!
//! In quad form, every pattern carries the graph it is matched against. `GRAPH` operators are
//! pushed down into the patterns and disappear from the tree.

mod graph_scope;
mod rewrite;

pub use graph_scope::{GraphScopeStack, PopGraphScope, PushGraphScope};
pub use rewrite::{quadize, QuadizationTransform};
