pub mod error;
mod quad_storage;

pub use quad_storage::QuadStorage;

use crate::error::AlgebraError;

/// The result type of all operations that generate, transform or reconstruct algebra trees.
pub type AlgebraResult<T> = Result<T, AlgebraError>;
