use serde::Deserialize;

use crate::models::{CompanyChanges, CompanyType, NewCompany};
use super::errors::CompanyError;
use super::validation::{validate_for_create, validate_for_update, ValidationError};
use super::value_objects::CompanyId;

// ============================================================================
// Company Command Payloads
// ============================================================================
//
// Strict request shapes: unknown fields are rejected at decode time, so the
// validators only ever see the known company fields.
//
// ============================================================================

/// Full payload for creating a company. Missing fields decode to their
/// defaults so the validator can report them by name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CreateCompany {
    pub name: String,
    pub description: String,
    pub employees: i32,
    pub registered: bool,
    #[serde(rename = "type")]
    pub company_type: String,
}

impl CreateCompany {
    /// Validate and attach the freshly generated identifier.
    pub fn into_new_company(self, id: CompanyId) -> Result<NewCompany, ValidationError> {
        validate_for_create(&self)?;
        let company_type = parse_type(&self.company_type)?;

        Ok(NewCompany {
            id: id.as_uuid(),
            name: self.name,
            description: self.description,
            employees: self.employees,
            registered: self.registered,
            company_type,
        })
    }
}

/// Sparse payload for a partial update. Absent keys are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCompany {
    pub name: Option<String>,
    pub description: Option<String>,
    pub employees: Option<i32>,
    pub registered: Option<bool>,
    #[serde(rename = "type")]
    pub company_type: Option<String>,
}

impl UpdateCompany {
    pub fn into_changes(self) -> Result<CompanyChanges, ValidationError> {
        validate_for_update(&self)?;
        let company_type = self.company_type.as_deref().map(parse_type).transpose()?;

        Ok(CompanyChanges {
            name: self.name,
            description: self.description,
            employees: self.employees,
            registered: self.registered,
            company_type,
        })
    }
}

fn parse_type(raw: &str) -> Result<CompanyType, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::TypeMissing);
    }
    raw.parse().map_err(|_| ValidationError::TypeUnknown)
}

/// Strict JSON decoding for command payloads.
pub fn decode<T: for<'de> Deserialize<'de>>(payload: &[u8]) -> Result<T, CompanyError> {
    serde_json::from_slice(payload).map_err(|e| CompanyError::MalformedInput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_unknown_fields() {
        let payload = br#"{"name":"Acme","employees":3,"registered":true,"type":"NonProfit","ceo":"x"}"#;
        let result = decode::<CreateCompany>(payload);
        assert!(matches!(result, Err(CompanyError::MalformedInput(msg)) if msg.contains("ceo")));

        let result = decode::<UpdateCompany>(br#"{"founded":1999}"#);
        assert!(matches!(result, Err(CompanyError::MalformedInput(_))));
    }

    #[test]
    fn test_decode_rejects_syntax_errors_and_wrong_types() {
        assert!(matches!(
            decode::<CreateCompany>(b"{not json"),
            Err(CompanyError::MalformedInput(_))
        ));
        assert!(matches!(
            decode::<UpdateCompany>(br#"{"employees":"ten"}"#),
            Err(CompanyError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_create_payload_missing_fields_fall_to_validation() {
        let request: CreateCompany = decode(br#"{"name":"Acme"}"#).unwrap();
        let result = request.into_new_company(CompanyId::generate());
        assert_eq!(result.unwrap_err(), ValidationError::EmployeesNotPositive);
    }

    #[test]
    fn test_create_payload_becomes_new_company() {
        let request: CreateCompany = decode(
            br#"{"name":"Acme","description":"anvils","employees":10,"registered":true,"type":"Sole Proprietorship"}"#,
        )
        .unwrap();
        let id = CompanyId::generate();
        let company = request.into_new_company(id).unwrap();

        assert_eq!(company.id, id.as_uuid());
        assert_eq!(company.name, "Acme");
        assert_eq!(company.company_type, CompanyType::SoleProprietorship);
    }

    #[test]
    fn test_update_payload_keeps_only_present_fields() {
        let request: UpdateCompany = decode(br#"{"name":"X"}"#).unwrap();
        let changes = request.into_changes().unwrap();

        assert_eq!(changes.name.as_deref(), Some("X"));
        assert_eq!(changes.employees, None);
        assert_eq!(changes.company_type, None);
    }

    #[test]
    fn test_update_payload_parses_type() {
        let request: UpdateCompany = decode(br#"{"type":"Cooperative","registered":false}"#).unwrap();
        let changes = request.into_changes().unwrap();

        assert_eq!(changes.company_type, Some(CompanyType::Cooperative));
        assert_eq!(changes.registered, Some(false));
    }
}
