use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::catalog::{PlantCatalog, ProductCatalog, ReferenceData};
use crate::domain::order::{OrderId, OrderRecord, OrderSummary, PlantRef, ProductCatalogEntry};

use super::{
    CommitAck, OrderCollectionProvider, PersistenceSink, ReferenceDataProvider, ServiceError,
};

// ============================================================================
// Mock Data Service - in-memory stand-in for the order backend
// ============================================================================

const SAMPLE_JSON: &str = include_str!("../../data/mock_orders.json");

/// Contents of a mock-data file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockData {
    #[serde(default)]
    pub receiving_plants: Vec<PlantRef>,
    #[serde(default)]
    pub delivering_plants: Vec<PlantRef>,
    #[serde(default)]
    pub products: Vec<ProductCatalogEntry>,
    #[serde(default)]
    pub orders: Vec<OrderRecord>,
}

impl MockData {
    /// Built-in sample shipped with the crate
    pub fn sample() -> Result<Self> {
        Self::from_json(SAMPLE_JSON).context("Built-in mock data is invalid")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read mock data from {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("Failed to parse mock data in {}", path.display()))
    }
}

pub struct MockDataService {
    data: RwLock<MockData>,
    pending_failures: AtomicU32,
}

impl MockDataService {
    pub fn new(data: MockData) -> Self {
        Self {
            data: RwLock::new(data),
            pending_failures: AtomicU32::new(0),
        }
    }

    /// Make the next `count` calls fail with [`ServiceError::Unavailable`]
    pub fn fail_next(&self, count: u32) {
        self.pending_failures.store(count, Ordering::SeqCst);
    }

    /// Fetch all three reference snapshots
    pub async fn reference_data(&self) -> Result<ReferenceData, ServiceError> {
        Ok(ReferenceData {
            receiving_plants: PlantCatalog::new(self.receiving_plants().await?),
            delivering_plants: PlantCatalog::new(self.delivering_plants().await?),
            products: ProductCatalog::new(self.products().await?),
        })
    }

    fn check_available(&self, call: &str) -> Result<(), ServiceError> {
        let injected = self
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        if injected {
            tracing::debug!(call, "Injected data service outage");
            return Err(ServiceError::Unavailable(format!("{} timed out", call)));
        }
        Ok(())
    }
}

#[async_trait]
impl ReferenceDataProvider for MockDataService {
    async fn receiving_plants(&self) -> Result<Vec<PlantRef>, ServiceError> {
        self.check_available("receiving_plants")?;
        Ok(self.data.read().await.receiving_plants.clone())
    }

    async fn delivering_plants(&self) -> Result<Vec<PlantRef>, ServiceError> {
        self.check_available("delivering_plants")?;
        Ok(self.data.read().await.delivering_plants.clone())
    }

    async fn products(&self) -> Result<Vec<ProductCatalogEntry>, ServiceError> {
        self.check_available("products")?;
        Ok(self.data.read().await.products.clone())
    }
}

#[async_trait]
impl OrderCollectionProvider for MockDataService {
    async fn orders(&self) -> Result<Vec<OrderSummary>, ServiceError> {
        self.check_available("orders")?;
        Ok(self.data.read().await.orders.iter().map(OrderRecord::summary).collect())
    }

    async fn order_detail(&self, order_id: OrderId) -> Result<Option<OrderRecord>, ServiceError> {
        self.check_available("order_detail")?;
        let data = self.data.read().await;
        Ok(data.orders.iter().find(|o| o.order_id == order_id).cloned())
    }
}

#[async_trait]
impl PersistenceSink for MockDataService {
    async fn submit(&self, record: OrderRecord) -> Result<CommitAck, ServiceError> {
        self.check_available("submit")?;

        let mut data = self.data.write().await;
        if data.orders.iter().any(|o| o.order_id == record.order_id) {
            return Err(ServiceError::DuplicateOrderId(record.order_id));
        }

        let ack = CommitAck {
            order_id: record.order_id,
            receipt_id: Uuid::new_v4(),
            accepted_at: Utc::now(),
        };

        tracing::info!(
            order_id = record.order_id,
            receipt_id = %ack.receipt_id,
            lines = record.lines.len(),
            "Order stored"
        );
        data.orders.push(record);

        Ok(ack)
    }
}
