//! Error taxonomy for the catalog data-access layer

/// Errors surfaced by repositories, the query builder and the transaction coordinator.
///
/// Storage failures are carried unchanged so callers can inspect the underlying
/// `sqlx::Error` (constraint violations, I/O failures, lock timeouts).
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("invalid query configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

impl CatalogError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;
