mod algebra_generator;
pub mod error;
mod eval;
mod op_as_query;
mod path_compiler;
mod syntax;

pub use algebra_generator::AlgebraGenerator;
pub use eval::{evaluate, Solution};
pub use op_as_query::OpAsQuery;
pub use syntax::{Element, Query};
