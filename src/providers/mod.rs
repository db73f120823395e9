// ============================================================================
// Collaborators - data service contracts
// ============================================================================
//
// The domain layer is synchronous and works on fetched snapshots. These
// async traits describe the services that supply those snapshots and accept
// committed orders. Callers await them, then hand the data to the domain.
//
// ============================================================================

pub mod mock_service;

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::order::{OrderId, OrderRecord, OrderSummary, PlantRef, ProductCatalogEntry};
use crate::utils::IsTransient;

pub use mock_service::{MockData, MockDataService};

/// Failures reported by a data service. Passed back to callers unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("Data service unavailable: {0}")]
    Unavailable(String),

    #[error("Data service rejected the request: {0}")]
    Rejected(String),

    #[error("Order {0} already exists")]
    DuplicateOrderId(OrderId),
}

impl IsTransient for ServiceError {
    fn is_transient(&self) -> bool {
        matches!(self, ServiceError::Unavailable(_))
    }
}

/// Acknowledgment for an accepted order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitAck {
    pub order_id: OrderId,
    pub receipt_id: Uuid,
    pub accepted_at: DateTime<Utc>,
}

#[async_trait]
pub trait ReferenceDataProvider: Send + Sync {
    async fn receiving_plants(&self) -> Result<Vec<PlantRef>, ServiceError>;

    async fn delivering_plants(&self) -> Result<Vec<PlantRef>, ServiceError>;

    async fn products(&self) -> Result<Vec<ProductCatalogEntry>, ServiceError>;
}

#[async_trait]
pub trait OrderCollectionProvider: Send + Sync {
    async fn orders(&self) -> Result<Vec<OrderSummary>, ServiceError>;

    /// Ids used to seed the next draft's order id
    async fn order_ids(&self) -> Result<BTreeSet<OrderId>, ServiceError> {
        Ok(self.orders().await?.iter().map(|o| o.order_id).collect())
    }

    /// Full order with its lines, if it exists
    async fn order_detail(&self, order_id: OrderId) -> Result<Option<OrderRecord>, ServiceError>;
}

#[async_trait]
pub trait PersistenceSink: Send + Sync {
    async fn submit(&self, record: OrderRecord) -> Result<CommitAck, ServiceError>;
}
