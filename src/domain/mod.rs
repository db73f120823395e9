// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// - order: composing a new order as a draft and committing it
// - catalog: read-only plant and product reference data
//
// Nothing here performs I/O; collaborators live in src/providers/.
//
// ============================================================================

pub mod order;
pub mod catalog;
