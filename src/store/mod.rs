// ============================================================================
// Identity Store - Ports
// ============================================================================
//
// Durable storage for credentials and company records. The command pipeline
// only sees these traits; atomicity of uniqueness and existence rules is the
// store's responsibility (no in-process locking above this layer).
//
// Reads, existence checks and name uniqueness ignore soft-deleted records.
//
// ============================================================================

mod postgres;
#[cfg(test)]
mod in_memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Company, CompanyChanges, NewCompany, User};

pub use postgres::{connect, ensure_schema, PgCompanyRepository, PgUserRepository};
#[cfg(test)]
pub use in_memory::InMemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("record not found")]
    NotFound,

    #[error("stored value is invalid: {0}")]
    InvalidData(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::UniqueViolation(db.constraint().unwrap_or("unknown").to_string())
            }
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Database(other),
        }
    }
}

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Insert a new record. A name clash with a live record is
    /// `UniqueViolation`, even when two inserts race.
    async fn insert(&self, company: NewCompany) -> Result<Company, StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<Company>, StoreError>;

    async fn exists(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn name_exists(&self, name: &str) -> Result<bool, StoreError>;

    /// Apply the present fields and bump `updated_at`. `NotFound` if the
    /// record vanished since the caller's existence check.
    async fn update(&self, id: Uuid, changes: &CompanyChanges) -> Result<Company, StoreError>;

    /// Mark the record deleted. `NotFound` if it is already gone.
    async fn soft_delete(&self, id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Exact, case-sensitive match.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Returns `false` when a user with that name already exists.
    async fn create_if_absent(&self, user: User) -> Result<bool, StoreError>;
}
