// ============================================================================
// Company Domain - write pipeline for company records
// ============================================================================
//
// This module contains ALL Company-specific code:
// - Value objects (CompanyId)
// - Commands (strict CreateCompany / UpdateCompany payloads)
// - Validation rules for create and partial update
// - Events (company_created, company_updated, company_deleted)
// - Errors (CompanyError enum)
// - Command Handler (CompanyCommandHandler)
//
// ============================================================================

pub mod value_objects;
pub mod validation;
pub mod events;
pub mod commands;
pub mod errors;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use validation::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use command_handler::*;
