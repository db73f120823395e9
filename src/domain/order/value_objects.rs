use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Order Value Objects
// ============================================================================

pub type OrderId = i64;
pub type PlantId = i64;
pub type ProductId = i64;

/// Receiving or delivering plant reference data
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlantRef {
    pub id: PlantId,
    pub description: String,
}

impl PlantRef {
    pub fn new(id: PlantId, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
        }
    }
}

/// One product offered by exactly one delivering plant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCatalogEntry {
    pub product_id: ProductId,
    pub description: String,
    pub delivering_plant_id: PlantId,
    pub unit_price: Decimal,
}

/// A product line inside a draft. The line total is derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    product_id: ProductId,
    description: String,
    quantity: i32,
    unit_price: Decimal,
}

impl OrderLine {
    pub fn new(product: &ProductCatalogEntry, quantity: i32) -> Self {
        Self {
            product_id: product.product_id,
            description: product.description.clone(),
            quantity,
            unit_price: product.unit_price,
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }

    pub(crate) fn set_quantity(&mut self, quantity: i32) {
        self.quantity = quantity;
    }
}

/// Order status code as exchanged with the order service ("CR", "RL", ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusCode {
    Created,
    Released,
    /// Any code this crate does not model, kept verbatim
    Other(String),
}

impl StatusCode {
    pub fn as_code(&self) -> &str {
        match self {
            StatusCode::Created => "CR",
            StatusCode::Released => "RL",
            StatusCode::Other(code) => code,
        }
    }
}

impl From<&str> for StatusCode {
    fn from(code: &str) -> Self {
        match code {
            "CR" => StatusCode::Created,
            "RL" => StatusCode::Released,
            other => StatusCode::Other(other.to_string()),
        }
    }
}

impl From<String> for StatusCode {
    fn from(code: String) -> Self {
        StatusCode::from(code.as_str())
    }
}

impl From<StatusCode> for String {
    fn from(status: StatusCode) -> Self {
        status.as_code().to_string()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// Row of the order list, as supplied by the order collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    /// Local wall-clock creation time
    pub creation_date: NaiveDateTime,
    #[serde(default)]
    pub receiving_plant_id: Option<PlantId>,
    #[serde(default)]
    pub delivering_plant_id: Option<PlantId>,
    pub status_code: StatusCode,
}

/// Line of a committed order, with its total frozen at commit time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordLine {
    pub product_id: ProductId,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl From<&OrderLine> for RecordLine {
    fn from(line: &OrderLine) -> Self {
        Self {
            product_id: line.product_id(),
            description: line.description().to_string(),
            quantity: line.quantity(),
            unit_price: line.unit_price(),
            line_total: line.line_total(),
        }
    }
}

/// Immutable order handed to the persistence sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: OrderId,
    pub creation_date: NaiveDate,
    pub receiving_plant: PlantRef,
    pub delivering_plant: PlantRef,
    pub status_code: StatusCode,
    pub lines: Vec<RecordLine>,
    pub total: Decimal,
}

impl OrderRecord {
    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            order_id: self.order_id,
            creation_date: self.creation_date.and_time(NaiveTime::MIN),
            receiving_plant_id: Some(self.receiving_plant.id),
            delivering_plant_id: Some(self.delivering_plant.id),
            status_code: self.status_code.clone(),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bolts() -> ProductCatalogEntry {
        ProductCatalogEntry {
            product_id: 10,
            description: "Steel bolts".to_string(),
            delivering_plant_id: 2,
            unit_price: dec!(2.50),
        }
    }

    #[test]
    fn test_line_total_follows_quantity() {
        let mut line = OrderLine::new(&bolts(), 4);
        assert_eq!(line.line_total(), dec!(10.00));

        line.set_quantity(7);
        assert_eq!(line.line_total(), dec!(17.50));
    }

    #[test]
    fn test_status_code_known_and_unknown() {
        assert_eq!(StatusCode::from("CR"), StatusCode::Created);
        assert_eq!(StatusCode::from("RL"), StatusCode::Released);
        assert_eq!(StatusCode::from("XX"), StatusCode::Other("XX".to_string()));
        assert_eq!(StatusCode::Other("XX".to_string()).as_code(), "XX");
    }

    #[test]
    fn test_status_code_serializes_as_code() {
        let json = serde_json::to_string(&StatusCode::Released).unwrap();
        assert_eq!(json, "\"RL\"");

        let status: StatusCode = serde_json::from_str("\"CR\"").unwrap();
        assert_eq!(status, StatusCode::Created);
    }

    #[test]
    fn test_record_line_freezes_total() {
        let line = OrderLine::new(&bolts(), 3);
        let record_line = RecordLine::from(&line);

        assert_eq!(record_line.quantity, 3);
        assert_eq!(record_line.line_total, dec!(7.50));
    }

    #[test]
    fn test_record_summary_starts_at_midnight() {
        let record = OrderRecord {
            order_id: 4,
            creation_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            receiving_plant: PlantRef::new(1, "Hamburg"),
            delivering_plant: PlantRef::new(2, "Leipzig"),
            status_code: StatusCode::Created,
            lines: vec![],
            total: Decimal::ZERO,
        };

        let summary = record.summary();
        assert_eq!(summary.order_id, 4);
        assert_eq!(summary.creation_date.to_string(), "2024-05-01 00:00:00");
        assert_eq!(summary.receiving_plant_id, Some(1));
    }
}
