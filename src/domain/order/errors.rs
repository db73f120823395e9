use std::fmt;

use super::value_objects::{PlantId, ProductId};

// ============================================================================
// Draft Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("Invalid line quantity: {0}")]
    InvalidQuantity(i32),

    #[error("A delivering plant must be selected before adding products")]
    NoDeliveringPlant,

    #[error("Product {product_id} is delivered by plant {product_plant_id}, not by plant {draft_plant_id}")]
    ProductPlantMismatch {
        product_id: ProductId,
        product_plant_id: PlantId,
        draft_plant_id: PlantId,
    },

    #[error("Receiving plant is not set")]
    MissingReceivingPlant,

    #[error("Delivering plant is not set")]
    MissingDeliveringPlant,

    #[error("Order has no product lines")]
    EmptyOrder,

    #[error("Quantity for product {0} exceeds the supported maximum")]
    QuantityOverflow(ProductId),

    #[error("Unknown plant: {0}")]
    UnknownPlant(PlantId),

    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),

    #[error("Plant {plant_id} is '{expected}', not '{found}'")]
    PlantDescriptionMismatch {
        plant_id: PlantId,
        expected: String,
        found: String,
    },

    #[error("Product {0} already has a line in this draft")]
    DuplicateLine(ProductId),

    #[error("Draft already started")]
    AlreadyStarted,

    #[error("Draft not initialized")]
    NotInitialized,
}

impl DraftError {
    /// Stable label used for metrics and structured logs
    pub fn reason(&self) -> &'static str {
        match self {
            DraftError::InvalidQuantity(_) => "invalid_quantity",
            DraftError::NoDeliveringPlant => "no_delivering_plant",
            DraftError::ProductPlantMismatch { .. } => "product_plant_mismatch",
            DraftError::MissingReceivingPlant => "missing_receiving_plant",
            DraftError::MissingDeliveringPlant => "missing_delivering_plant",
            DraftError::EmptyOrder => "empty_order",
            DraftError::QuantityOverflow(_) => "quantity_overflow",
            DraftError::UnknownPlant(_) => "unknown_plant",
            DraftError::UnknownProduct(_) => "unknown_product",
            DraftError::PlantDescriptionMismatch { .. } => "plant_description_mismatch",
            DraftError::DuplicateLine(_) => "duplicate_line",
            DraftError::AlreadyStarted => "already_started",
            DraftError::NotInitialized => "not_initialized",
        }
    }
}

/// Every precondition that failed when validating a draft
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Draft order is incomplete: {}", DisplayList(.0))]
pub struct ValidationErrors(Vec<DraftError>);

impl ValidationErrors {
    pub(crate) fn new(failures: Vec<DraftError>) -> Self {
        Self(failures)
    }

    /// Returns `None` when nothing failed
    pub fn from_failures(failures: Vec<DraftError>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self(failures))
        }
    }

    pub fn errors(&self) -> &[DraftError] {
        &self.0
    }

    pub fn contains(&self, error: &DraftError) -> bool {
        self.0.contains(error)
    }
}

struct DisplayList<'a>(&'a [DraftError]);

impl fmt::Display for DisplayList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_lists_every_failure() {
        let errors = ValidationErrors::from_failures(vec![
            DraftError::MissingReceivingPlant,
            DraftError::EmptyOrder,
        ])
        .unwrap();

        assert_eq!(errors.errors().len(), 2);
        assert_eq!(
            errors.to_string(),
            "Draft order is incomplete: Receiving plant is not set; Order has no product lines"
        );
    }

    #[test]
    fn test_no_failures_means_no_error() {
        assert!(ValidationErrors::from_failures(vec![]).is_none());
    }
}
