// ============================================================================
// Event Sourcing Infrastructure
// ============================================================================
//
// Generic command -> events -> state machinery shared by in-memory aggregates.
// Domain-specific code is in src/domain/
//
// ============================================================================

mod core;

pub use self::core::*;
