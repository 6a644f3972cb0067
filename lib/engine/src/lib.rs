//! Compiles query patterns into the SPARQL algebra and back.
//!
//! The [AlgebraEngine] ties the individual steps together: the
//! [AlgebraGenerator](sparql::AlgebraGenerator) compiles a [Query](sparql::Query) into an
//! operator tree, which is then rewritten according to the [AlgebraConfig]. The
//! [OpAsQuery](sparql::OpAsQuery) reverse compiler converts operator trees back into queries.

mod config;
mod engine;
pub mod sparql;

pub use config::AlgebraConfig;
pub use engine::AlgebraEngine;
