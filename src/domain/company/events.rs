use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::Company;
use super::value_objects::CompanyId;

// ============================================================================
// Company Domain Events
// ============================================================================
//
// Published once per successful mutation. Created/updated events carry the
// full record; deleted events carry only the identifier.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyEventType {
    CompanyCreated,
    CompanyUpdated,
    CompanyDeleted,
}

impl CompanyEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyEventType::CompanyCreated => "company_created",
            CompanyEventType::CompanyUpdated => "company_updated",
            CompanyEventType::CompanyDeleted => "company_deleted",
        }
    }
}

impl fmt::Display for CompanyEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload carried by an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompanySnapshot {
    Full(Company),
    Reference { id: Uuid },
}

impl CompanySnapshot {
    pub fn id(&self) -> Uuid {
        match self {
            CompanySnapshot::Full(company) => company.id,
            CompanySnapshot::Reference { id } => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyEvent {
    pub event_type: CompanyEventType,
    /// RFC 3339, UTC, second precision.
    pub timestamp: String,
    pub company: CompanySnapshot,
}

impl CompanyEvent {
    fn new(event_type: CompanyEventType, company: CompanySnapshot) -> Self {
        Self {
            event_type,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            company,
        }
    }

    pub fn created(company: Company) -> Self {
        Self::new(CompanyEventType::CompanyCreated, CompanySnapshot::Full(company))
    }

    pub fn updated(company: Company) -> Self {
        Self::new(CompanyEventType::CompanyUpdated, CompanySnapshot::Full(company))
    }

    pub fn deleted(id: CompanyId) -> Self {
        Self::new(
            CompanyEventType::CompanyDeleted,
            CompanySnapshot::Reference { id: id.as_uuid() },
        )
    }

    /// Partition key: events for one company stay ordered.
    pub fn key(&self) -> String {
        self.company.id().to_string()
    }

    pub fn to_payload(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
