use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::event_sourcing::DomainEvent;
use super::value_objects::{OrderId, OrderLine, PlantRef, ProductId};

// ============================================================================
// Draft Events - Facts recorded while composing an order
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DraftEvent {
    Started(DraftStarted),
    ReceivingPlantSet(PlantAssigned),
    DeliveringPlantSet(PlantAssigned),
    LineAdded(LineAdded),
    LineMerged(LineMerged),
    LinesRemoved(LinesRemoved),
}

impl DomainEvent for DraftEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DraftEvent::Started(_) => "DraftStarted",
            DraftEvent::ReceivingPlantSet(_) => "ReceivingPlantSet",
            DraftEvent::DeliveringPlantSet(_) => "DeliveringPlantSet",
            DraftEvent::LineAdded(_) => "LineAdded",
            DraftEvent::LineMerged(_) => "LineMerged",
            DraftEvent::LinesRemoved(_) => "LinesRemoved",
        }
    }
}

// ============================================================================
// Individual Event Types
// ============================================================================

/// Draft Started - next free order id reserved
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DraftStarted {
    pub order_id: OrderId,
    pub creation_date: NaiveDate,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlantAssigned {
    pub plant: PlantRef,
}

/// Line Added - first selection of a product
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LineAdded {
    pub line: OrderLine,
}

/// Line Merged - repeated selection of a product already in the draft
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LineMerged {
    pub product_id: ProductId,
    pub added_quantity: i32,
    pub new_quantity: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LinesRemoved {
    pub product_ids: Vec<ProductId>,
}
