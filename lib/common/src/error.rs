use std::error::Error;

/// An error raised while generating, transforming, or reconstructing an algebra tree.
///
/// Both kinds are fatal for the current call. Neither kind is caused by the user writing an
/// invalid query; the parser is responsible for rejecting those.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum AlgebraError {
    /// The input tree has a shape that the algorithm does not define a case for, or an
    /// invariant of the transformation framework has been violated.
    #[error("Internal compiler error: {0}")]
    InternalCompilerError(String),
    /// The reverse compiler cannot express an operator as a pattern tree.
    #[error("Operator cannot be converted into a query pattern: {0}")]
    UnsupportedReconstruction(String),
}

impl AlgebraError {
    /// Creates a result with an [AlgebraError::InternalCompilerError].
    pub fn internal<T>(cause: impl Into<String>) -> Result<T, Self> {
        Err(AlgebraError::InternalCompilerError(cause.into()))
    }

    /// Creates a result with an [AlgebraError::UnsupportedReconstruction].
    pub fn unsupported<T>(cause: impl Into<String>) -> Result<T, Self> {
        Err(AlgebraError::UnsupportedReconstruction(cause.into()))
    }
}

/// An error related to storage operations (reads, writes...).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StorageError {
    /// The storage cannot store the given quad (e.g., a quad in a reserved graph).
    #[error("The quad cannot be stored: {0}")]
    InvalidQuad(String),
    #[error("{0}")]
    Other(#[source] Box<dyn Error + Send + Sync + 'static>),
}
