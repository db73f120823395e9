// ============================================================================
// Order Filtering
// ============================================================================
//
// Criterion categories (order id, creation day, status) combine with AND;
// the selected status codes combine with OR. Inactive categories match all.
//
// ============================================================================

pub mod criteria;
pub mod engine;

pub use criteria::{DayRange, FilterCriteria, OrderIdQuery};
pub use engine::{OrderFacts, OrderFilterEngine};
