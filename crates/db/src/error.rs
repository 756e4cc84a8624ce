use atelier_core::error::CoreError;

/// Error type for multi-step repository operations that can fail for
/// domain reasons (capacity, conflicts, validation) as well as plain
/// database reasons.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl RepoError {
    pub fn not_found(entity: &'static str, id: atelier_core::types::DbId) -> Self {
        RepoError::Core(CoreError::NotFound { entity, id })
    }
}
