use std::collections::BTreeSet;

use super::value_objects::{PlantRef, ProductCatalogEntry, ProductId};

// ============================================================================
// Draft Commands - Represent user intent while composing an order
// ============================================================================

#[derive(Debug, Clone)]
pub enum DraftCommand {
    SetReceivingPlant {
        plant: PlantRef,
    },
    SetDeliveringPlant {
        plant: PlantRef,
    },
    AddOrMergeLine {
        product: ProductCatalogEntry,
        quantity: i32,
    },
    RemoveLines {
        product_ids: BTreeSet<ProductId>,
    },
}
