use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::errors::CompanyError;

// ============================================================================
// Company Value Objects
// ============================================================================

/// Company identifier. Only the canonical hyphenated form (five
/// dash-separated groups) is accepted from clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub Uuid);

impl CompanyId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Syntactic check only; never touches the store.
    pub fn parse(raw: &str) -> Result<Self, CompanyError> {
        let canonical = raw.len() == 36 && raw.split('-').count() == 5;
        if !canonical {
            return Err(CompanyError::InvalidIdentifier(raw.to_string()));
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| CompanyError::InvalidIdentifier(raw.to_string()))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}
