// ============================================================================
// Order Domain - Draft composition
// ============================================================================
//
// - Value objects (PlantRef, ProductCatalogEntry, OrderLine, OrderRecord, ...)
// - Events (DraftStarted, LineAdded, LineMerged, ...)
// - Commands (SetReceivingPlant, AddOrMergeLine, RemoveLines, ...)
// - Errors (DraftError, ValidationErrors)
// - Aggregate (DraftOrder with business rules)
// - Command Handler (DraftOrderBuilder)
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use command_handler::*;
