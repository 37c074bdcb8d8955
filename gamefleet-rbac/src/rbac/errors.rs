//! Error types for the RBAC engine

/// Result type used by the engine's public API
pub type RbacResult<T> = Result<T, RbacError>;

/// RBAC engine error
///
/// A denied authorization is never an error: every `can*` check answers
/// `Ok(false)`. An `Err` always means resolution itself failed.
#[derive(thiserror::Error, Debug)]
pub enum RbacError {
    /// A requested role name does not exist in the role catalog
    #[error("invalid role name: {0}")]
    InvalidRoleName(String),

    /// Storage or transaction failure, carrying its context chain
    #[error(transparent)]
    Repository(#[from] anyhow::Error),
}

impl RbacError {
    /// Recover a typed error that crossed a transaction boundary as `anyhow::Error`.
    pub(crate) fn from_transaction(err: anyhow::Error) -> Self {
        match err.downcast::<RbacError>() {
            Ok(rbac) => rbac,
            Err(other) => RbacError::Repository(other),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidRoleName(_))
    }
}
