use crate::domain::order::{DraftError, PlantId, PlantRef};

/// Snapshot of receiving or delivering plants
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlantCatalog {
    plants: Vec<PlantRef>,
}

impl PlantCatalog {
    pub fn new(plants: Vec<PlantRef>) -> Self {
        Self { plants }
    }

    pub fn plants(&self) -> &[PlantRef] {
        &self.plants
    }

    pub fn find(&self, id: PlantId) -> Option<&PlantRef> {
        self.plants.iter().find(|plant| plant.id == id)
    }

    pub fn find_by_description(&self, description: &str) -> Option<&PlantRef> {
        self.plants.iter().find(|plant| plant.description == description)
    }

    /// Case-insensitive description search, as used by a plant picker
    pub fn search(&self, query: &str) -> Vec<&PlantRef> {
        let query = query.to_lowercase();
        self.plants
            .iter()
            .filter(|plant| plant.description.to_lowercase().contains(&query))
            .collect()
    }

    /// Description for list display; empty when the id is unset or unknown
    pub fn description_for(&self, id: Option<PlantId>) -> &str {
        id.and_then(|id| self.find(id))
            .map(|plant| plant.description.as_str())
            .unwrap_or("")
    }

    /// Resolve a plant by id. A description supplied alongside must agree
    /// with the catalog; a mismatch is reported, never silently resolved.
    pub fn resolve(&self, id: PlantId, description: Option<&str>) -> Result<PlantRef, DraftError> {
        let plant = self.find(id).ok_or(DraftError::UnknownPlant(id))?;

        match description {
            Some(found) if found != plant.description => {
                Err(DraftError::PlantDescriptionMismatch {
                    plant_id: id,
                    expected: plant.description.clone(),
                    found: found.to_string(),
                })
            }
            _ => Ok(plant.clone()),
        }
    }
}
