use rdf_fusion_common::error::{AlgebraError, StorageError};

/// An error raised while evaluating an operator tree with the reference evaluator.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EvaluationError {
    /// An error from the storage.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// An error while compiling or rewriting the operator tree.
    #[error(transparent)]
    Algebra(#[from] AlgebraError),
    #[error("A feature has not yet been implemented: {0}")]
    NotImplemented(String),
}

impl EvaluationError {
    pub fn not_implemented<T>(feature: impl Into<String>) -> Result<T, Self> {
        Err(EvaluationError::NotImplemented(feature.into()))
    }
}
