// ============================================================================
// Reference Data Catalogs
// ============================================================================
//
// Read-only snapshots fetched once per session. Joins always use numeric ids;
// description lookups are for presentation only.
//
// ============================================================================

pub mod plants;
pub mod products;

pub use plants::PlantCatalog;
pub use products::ProductCatalog;

/// Everything a draft session needs from the reference-data provider
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub receiving_plants: PlantCatalog,
    pub delivering_plants: PlantCatalog,
    pub products: ProductCatalog,
}
