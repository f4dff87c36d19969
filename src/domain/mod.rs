// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each entity has its own subdirectory with value objects, commands,
// validation, events, errors and a command handler.
//
// ============================================================================

pub mod company;
