//! Rewrites patterns on the default graph into patterns over the union of all named graphs.

mod rewrite;

pub use rewrite::{rewrite_union_default_graph, UnionDefaultGraphTransform};
