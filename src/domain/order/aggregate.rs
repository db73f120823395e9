use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::event_sourcing::Aggregate;
use super::commands::DraftCommand;
use super::errors::{DraftError, ValidationErrors};
use super::events::*;
use super::value_objects::{
    OrderId, OrderLine, OrderRecord, PlantRef, ProductCatalogEntry, ProductId, RecordLine,
    StatusCode,
};

// ============================================================================
// Draft Order Aggregate - Domain Logic
// ============================================================================

/// An order under construction. Owned by exactly one caller until it is
/// committed or dropped; all changes go through [`DraftCommand`]s.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftOrder {
    order_id: OrderId,
    version: i64,
    creation_date: NaiveDate,
    receiving_plant: Option<PlantRef>,
    delivering_plant: Option<PlantRef>,
    status_code: StatusCode,
    lines: Vec<OrderLine>,
}

impl DraftOrder {
    pub(crate) fn start(order_id: OrderId, creation_date: NaiveDate) -> Self {
        Self {
            order_id,
            version: 0,
            creation_date,
            receiving_plant: None,
            delivering_plant: None,
            status_code: StatusCode::Created,
            lines: Vec::new(),
        }
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn creation_date(&self) -> NaiveDate {
        self.creation_date
    }

    pub fn receiving_plant(&self) -> Option<&PlantRef> {
        self.receiving_plant.as_ref()
    }

    pub fn delivering_plant(&self) -> Option<&PlantRef> {
        self.delivering_plant.as_ref()
    }

    pub fn status_code(&self) -> &StatusCode {
        &self.status_code
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn line(&self, product_id: ProductId) -> Option<&OrderLine> {
        self.lines.iter().find(|line| line.product_id() == product_id)
    }

    pub fn total(&self) -> Decimal {
        self.lines.iter().map(OrderLine::line_total).sum()
    }

    /// Check every commit precondition independently
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        match ValidationErrors::from_failures(self.unmet_preconditions()) {
            Some(errors) => Err(errors),
            None => Ok(()),
        }
    }

    /// Freeze a valid draft into the record handed to the persistence sink
    pub fn into_record(self) -> Result<OrderRecord, ValidationErrors> {
        let failures = self.unmet_preconditions();
        let total = self.total();
        let lines = self.lines.iter().map(RecordLine::from).collect();

        match (self.receiving_plant, self.delivering_plant) {
            (Some(receiving_plant), Some(delivering_plant)) if failures.is_empty() => {
                Ok(OrderRecord {
                    order_id: self.order_id,
                    creation_date: self.creation_date,
                    receiving_plant,
                    delivering_plant,
                    status_code: self.status_code,
                    lines,
                    total,
                })
            }
            _ => Err(ValidationErrors::new(failures)),
        }
    }

    fn unmet_preconditions(&self) -> Vec<DraftError> {
        let mut failures = Vec::new();

        if self.receiving_plant.is_none() {
            failures.push(DraftError::MissingReceivingPlant);
        }
        if self.delivering_plant.is_none() {
            failures.push(DraftError::MissingDeliveringPlant);
        }
        if self.lines.is_empty() {
            failures.push(DraftError::EmptyOrder);
        }

        failures
    }

    fn line_events(
        &self,
        product: &ProductCatalogEntry,
        quantity: i32,
    ) -> Result<Vec<DraftEvent>, DraftError> {
        let delivering_plant = self
            .delivering_plant
            .as_ref()
            .ok_or(DraftError::NoDeliveringPlant)?;

        if quantity <= 0 {
            return Err(DraftError::InvalidQuantity(quantity));
        }

        if product.delivering_plant_id != delivering_plant.id {
            return Err(DraftError::ProductPlantMismatch {
                product_id: product.product_id,
                product_plant_id: product.delivering_plant_id,
                draft_plant_id: delivering_plant.id,
            });
        }

        match self.line(product.product_id) {
            Some(existing) => {
                let new_quantity = existing
                    .quantity()
                    .checked_add(quantity)
                    .ok_or(DraftError::QuantityOverflow(product.product_id))?;

                Ok(vec![DraftEvent::LineMerged(LineMerged {
                    product_id: product.product_id,
                    added_quantity: quantity,
                    new_quantity,
                })])
            }
            None => Ok(vec![DraftEvent::LineAdded(LineAdded {
                line: OrderLine::new(product, quantity),
            })]),
        }
    }
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for DraftOrder {
    type Event = DraftEvent;
    type Command = DraftCommand;
    type Error = DraftError;

    fn apply_first_event(event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            DraftEvent::Started(e) => Ok(Self::start(e.order_id, e.creation_date)),
            _ => Err(DraftError::NotInitialized),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            DraftEvent::Started(_) => return Err(DraftError::AlreadyStarted),
            DraftEvent::ReceivingPlantSet(e) => {
                self.receiving_plant = Some(e.plant.clone());
            }
            DraftEvent::DeliveringPlantSet(e) => {
                self.delivering_plant = Some(e.plant.clone());
            }
            DraftEvent::LineAdded(e) => {
                if self.line(e.line.product_id()).is_some() {
                    return Err(DraftError::DuplicateLine(e.line.product_id()));
                }
                self.lines.push(e.line.clone());
            }
            DraftEvent::LineMerged(e) => {
                let line = self
                    .lines
                    .iter_mut()
                    .find(|line| line.product_id() == e.product_id)
                    .ok_or(DraftError::UnknownProduct(e.product_id))?;
                line.set_quantity(e.new_quantity);
            }
            DraftEvent::LinesRemoved(e) => {
                self.lines
                    .retain(|line| !e.product_ids.contains(&line.product_id()));
            }
        }

        self.version += 1;
        Ok(())
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            DraftCommand::SetReceivingPlant { plant } => {
                Ok(vec![DraftEvent::ReceivingPlantSet(PlantAssigned {
                    plant: plant.clone(),
                })])
            }

            DraftCommand::SetDeliveringPlant { plant } => {
                Ok(vec![DraftEvent::DeliveringPlantSet(PlantAssigned {
                    plant: plant.clone(),
                })])
            }

            DraftCommand::AddOrMergeLine { product, quantity } => {
                self.line_events(product, *quantity)
            }

            DraftCommand::RemoveLines { product_ids } => {
                let present: Vec<ProductId> = self
                    .lines
                    .iter()
                    .map(OrderLine::product_id)
                    .filter(|id| product_ids.contains(id))
                    .collect();

                if present.is_empty() {
                    return Ok(vec![]);
                }

                Ok(vec![DraftEvent::LinesRemoved(LinesRemoved {
                    product_ids: present,
                })])
            }
        }
    }

    fn aggregate_id(&self) -> i64 {
        self.order_id
    }

    fn version(&self) -> i64 {
        self.version
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
