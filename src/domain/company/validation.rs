use crate::models::CompanyType;
use super::commands::{CreateCompany, UpdateCompany};

// ============================================================================
// Company Validation Rules
// ============================================================================
//
// Creation checks a complete object and stops at the first failure, in the
// order name -> employees -> registered -> type -> description.
// Updates apply the same single-field rules to whichever fields are present,
// except that employees may be zero.
//
// ============================================================================

pub const NAME_MAX_CHARS: usize = 15;
pub const DESCRIPTION_MAX_CHARS: usize = 3000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid 'Name': it is required and must be at most 15 characters")]
    Name,

    #[error("Invalid 'Description': it must be at most 3000 characters")]
    DescriptionTooLong,

    #[error("Invalid 'Employees': it must be a positive number")]
    EmployeesNotPositive,

    #[error("Invalid 'Employees': it must not be negative")]
    EmployeesNegative,

    #[error("Invalid 'Registered': it is required and must be true")]
    NotRegistered,

    #[error("Invalid 'Type': it is required")]
    TypeMissing,

    #[error("Invalid 'Type': must be one of 'Corporations', 'NonProfit', 'Cooperative', 'Sole Proprietorship'")]
    TypeUnknown,
}

pub fn validate_for_create(candidate: &CreateCompany) -> Result<(), ValidationError> {
    check_name(&candidate.name)?;

    if candidate.employees <= 0 {
        return Err(ValidationError::EmployeesNotPositive);
    }

    // Creating an unregistered company is rejected; updates may flip the flag.
    if !candidate.registered {
        return Err(ValidationError::NotRegistered);
    }

    check_type(&candidate.company_type)?;
    check_description(&candidate.description)
}

pub fn validate_for_update(fields: &UpdateCompany) -> Result<(), ValidationError> {
    if let Some(ref name) = fields.name {
        check_name(name)?;
    }
    if let Some(ref description) = fields.description {
        check_description(description)?;
    }
    if let Some(employees) = fields.employees {
        if employees < 0 {
            return Err(ValidationError::EmployeesNegative);
        }
    }
    if let Some(ref company_type) = fields.company_type {
        check_type(company_type)?;
    }
    Ok(())
}

fn check_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() || name.chars().count() > NAME_MAX_CHARS {
        return Err(ValidationError::Name);
    }
    Ok(())
}

fn check_description(description: &str) -> Result<(), ValidationError> {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(ValidationError::DescriptionTooLong);
    }
    Ok(())
}

fn check_type(company_type: &str) -> Result<(), ValidationError> {
    if company_type.is_empty() {
        return Err(ValidationError::TypeMissing);
    }
    company_type
        .parse::<CompanyType>()
        .map(|_| ())
        .map_err(|_| ValidationError::TypeUnknown)
}
