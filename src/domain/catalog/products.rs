use crate::domain::order::{DraftError, PlantId, ProductCatalogEntry, ProductId};

/// Snapshot of every product across all delivering plants
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductCatalog {
    entries: Vec<ProductCatalogEntry>,
}

impl ProductCatalog {
    pub fn new(entries: Vec<ProductCatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ProductCatalogEntry] {
        &self.entries
    }

    pub fn find(&self, product_id: ProductId) -> Result<&ProductCatalogEntry, DraftError> {
        self.entries
            .iter()
            .find(|entry| entry.product_id == product_id)
            .ok_or(DraftError::UnknownProduct(product_id))
    }

    /// Products a draft may offer once `plant_id` is its delivering plant
    pub fn for_delivering_plant(&self, plant_id: PlantId) -> Vec<&ProductCatalogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.delivering_plant_id == plant_id)
            .collect()
    }
}
