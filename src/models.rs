use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Data Models
// ============================================================================
//
// Shapes shared by the store, the command pipeline and the HTTP surface.
// Request payloads live with the commands in `domain::company`.
//
// ============================================================================

/// Legal form of a company. Serialized with the exact labels clients send.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompanyType {
    Corporations,
    NonProfit,
    Cooperative,
    #[serde(rename = "Sole Proprietorship")]
    SoleProprietorship,
}

impl CompanyType {
    pub const ALL: [CompanyType; 4] = [
        CompanyType::Corporations,
        CompanyType::NonProfit,
        CompanyType::Cooperative,
        CompanyType::SoleProprietorship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyType::Corporations => "Corporations",
            CompanyType::NonProfit => "NonProfit",
            CompanyType::Cooperative => "Cooperative",
            CompanyType::SoleProprietorship => "Sole Proprietorship",
        }
    }
}

impl fmt::Display for CompanyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown company type: {0}")]
pub struct UnknownCompanyType(pub String);

impl FromStr for CompanyType {
    type Err = UnknownCompanyType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompanyType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownCompanyType(s.to_string()))
    }
}

/// A persisted company record.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub employees: i32,
    pub registered: bool,
    #[serde(rename = "type")]
    pub company_type: CompanyType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A validated company that has not been stored yet. The id is assigned by
/// the command pipeline; timestamps are assigned by the store.
#[derive(Clone, Debug, PartialEq)]
pub struct NewCompany {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub employees: i32,
    pub registered: bool,
    pub company_type: CompanyType,
}

/// Sparse set of validated field changes for a partial update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompanyChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub employees: Option<i32>,
    pub registered: Option<bool>,
    pub company_type: Option<CompanyType>,
}

impl CompanyChanges {
    /// Apply the present fields onto an existing record.
    pub fn apply_to(&self, company: &mut Company) {
        if let Some(ref name) = self.name {
            company.name = name.clone();
        }
        if let Some(ref description) = self.description {
            company.description = description.clone();
        }
        if let Some(employees) = self.employees {
            company.employees = employees;
        }
        if let Some(registered) = self.registered {
            company.registered = registered;
        }
        if let Some(company_type) = self.company_type {
            company.company_type = company_type;
        }
    }
}

/// Credential record. The password is only ever held as a PHC hash string.
#[derive(Clone, Debug)]
pub struct User {
    pub username: String,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_type_labels_round_trip_through_from_str() {
        for t in CompanyType::ALL {
            assert_eq!(t.as_str().parse::<CompanyType>().unwrap(), t);
        }
        assert!("Partnership".parse::<CompanyType>().is_err());
        assert!("corporations".parse::<CompanyType>().is_err());
    }

    #[test]
    fn test_company_serializes_with_api_field_names() {
        let now = Utc::now();
        let company = Company {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            description: String::new(),
            employees: 10,
            registered: true,
            company_type: CompanyType::SoleProprietorship,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let json = serde_json::to_value(&company).unwrap();
        assert_eq!(json["type"], "Sole Proprietorship");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json["deletedAt"].is_null());
    }

    #[test]
    fn test_changes_only_touch_present_fields() {
        let now = Utc::now();
        let mut company = Company {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            description: "widgets".to_string(),
            employees: 10,
            registered: true,
            company_type: CompanyType::Corporations,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let changes = CompanyChanges {
            name: Some("Acme2".to_string()),
            ..Default::default()
        };
        changes.apply_to(&mut company);

        assert_eq!(company.name, "Acme2");
        assert_eq!(company.description, "widgets");
        assert_eq!(company.employees, 10);
        assert_eq!(company.company_type, CompanyType::Corporations);
    }
}
