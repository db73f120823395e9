use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::event_sourcing::{Aggregate, DomainEvent, EventEnvelope};
use crate::metrics::Metrics;

use super::aggregate::DraftOrder;
use super::commands::DraftCommand;
use super::errors::{DraftError, ValidationErrors};
use super::events::{DraftEvent, DraftStarted};
use super::value_objects::{OrderId, OrderRecord, PlantRef, ProductCatalogEntry, ProductId};

// ============================================================================
// Draft Order Builder
// ============================================================================
//
// Orchestrates: Command -> Draft -> Events -> applied Draft
//
// The builder holds no draft itself. Callers own their DraftOrder and pass
// it in; every mutation either applies fully or leaves the draft untouched.
//
// ============================================================================

/// Events produced by one builder operation, wrapped for the caller's audit trail
pub type DraftChanges = Vec<EventEnvelope<DraftEvent>>;

#[derive(Clone, Default)]
pub struct DraftOrderBuilder {
    metrics: Option<Arc<Metrics>>,
}

impl DraftOrderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(metrics: Arc<Metrics>) -> Self {
        Self {
            metrics: Some(metrics),
        }
    }

    /// Start a draft dated today with the next free order id
    pub fn create<I>(&self, existing_order_ids: I) -> (DraftOrder, DraftChanges)
    where
        I: IntoIterator<Item = OrderId>,
    {
        self.create_on(existing_order_ids, Local::now().date_naive())
    }

    /// Start a draft with `max(existing) + 1` as its id (1 when none exist).
    ///
    /// The returned changes hold the `DraftStarted` event at sequence 0, so
    /// the changes of a whole session can be replayed with `load_from_events`.
    pub fn create_on<I>(
        &self,
        existing_order_ids: I,
        creation_date: NaiveDate,
    ) -> (DraftOrder, DraftChanges)
    where
        I: IntoIterator<Item = OrderId>,
    {
        let order_id = existing_order_ids.into_iter().max().unwrap_or(0) + 1;
        let draft = DraftOrder::start(order_id, creation_date);
        let started = DraftEvent::Started(DraftStarted {
            order_id,
            creation_date,
        });

        if let Some(metrics) = &self.metrics {
            metrics.drafts_started.inc();
        }
        tracing::debug!(order_id, %creation_date, "Draft order started");

        let envelope = EventEnvelope::new(
            order_id,
            draft.version(),
            started.event_type().to_string(),
            started,
        );
        (draft, vec![envelope])
    }

    /// Replace the receiving plant. Never fails.
    pub fn set_receiving_plant(
        &self,
        draft: &mut DraftOrder,
        plant: PlantRef,
    ) -> Result<DraftChanges, DraftError> {
        self.execute(draft, DraftCommand::SetReceivingPlant { plant })
    }

    /// Replace the delivering plant. Never fails.
    pub fn set_delivering_plant(
        &self,
        draft: &mut DraftOrder,
        plant: PlantRef,
    ) -> Result<DraftChanges, DraftError> {
        self.execute(draft, DraftCommand::SetDeliveringPlant { plant })
    }

    /// Add a product line, or grow the existing line for the same product
    pub fn add_or_merge_line(
        &self,
        draft: &mut DraftOrder,
        product: &ProductCatalogEntry,
        quantity: i32,
    ) -> Result<DraftChanges, DraftError> {
        self.execute(
            draft,
            DraftCommand::AddOrMergeLine {
                product: product.clone(),
                quantity,
            },
        )
    }

    /// Copy of `draft` without the lines for `product_ids`; absent ids are ignored.
    /// `draft` itself is never touched.
    pub fn remove_lines(
        &self,
        draft: &DraftOrder,
        product_ids: &BTreeSet<ProductId>,
    ) -> (DraftOrder, DraftChanges) {
        let mut next = draft.clone();
        let command = DraftCommand::RemoveLines {
            product_ids: product_ids.clone(),
        };

        match self.execute(&mut next, command) {
            Ok(changes) => (next, changes),
            Err(e) => {
                tracing::error!(order_id = draft.order_id(), error = %e, "Line removal failed");
                (draft.clone(), Vec::new())
            }
        }
    }

    pub fn validate(&self, draft: &DraftOrder) -> Result<(), ValidationErrors> {
        draft.validate().inspect_err(|errors| self.record_incomplete(draft.order_id(), errors))
    }

    /// Turn a valid draft into an immutable record for the persistence sink
    pub fn commit(&self, draft: DraftOrder) -> Result<OrderRecord, ValidationErrors> {
        let order_id = draft.order_id();
        let record = draft
            .into_record()
            .inspect_err(|errors| self.record_incomplete(order_id, errors))?;

        if let Some(metrics) = &self.metrics {
            metrics.orders_committed.inc();
        }
        tracing::info!(
            order_id,
            lines = record.lines.len(),
            total = %record.total,
            "Draft order committed"
        );

        Ok(record)
    }

    fn execute(&self, draft: &mut DraftOrder, command: DraftCommand) -> Result<DraftChanges, DraftError> {
        let events = match draft.execute(&command) {
            Ok(events) => events,
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_rejection(e.reason());
                }
                tracing::warn!(
                    order_id = draft.order_id(),
                    reason = e.reason(),
                    error = %e,
                    "Draft command rejected"
                );
                return Err(e);
            }
        };

        // Events are already applied; number them from the resulting version
        let first_seq = draft.version() - events.len() as i64 + 1;
        let mut changes = Vec::with_capacity(events.len());

        for (offset, event) in events.into_iter().enumerate() {
            if let Some(metrics) = &self.metrics {
                match &event {
                    DraftEvent::LineAdded(_) => metrics.record_line_change("added"),
                    DraftEvent::LineMerged(_) => metrics.record_line_change("merged"),
                    DraftEvent::LinesRemoved(_) => metrics.record_line_change("removed"),
                    _ => {}
                }
            }

            tracing::debug!(
                order_id = draft.order_id(),
                event_type = event.event_type(),
                version = draft.version(),
                "Draft event applied"
            );

            changes.push(EventEnvelope::new(
                draft.order_id(),
                first_seq + offset as i64,
                event.event_type().to_string(),
                event,
            ));
        }

        Ok(changes)
    }

    fn record_incomplete(&self, order_id: OrderId, errors: &ValidationErrors) {
        if let Some(metrics) = &self.metrics {
            for error in errors.errors() {
                metrics.record_rejection(error.reason());
            }
        }
        tracing::warn!(order_id, error = %errors, "Draft order incomplete");
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn builder() -> (DraftOrderBuilder, Arc<Metrics>) {
        let metrics = Arc::new(Metrics::new().unwrap());
        (DraftOrderBuilder::with_metrics(metrics.clone()), metrics)
    }

    fn may_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn product(product_id: ProductId, plant_id: i64, price: Decimal) -> ProductCatalogEntry {
        ProductCatalogEntry {
            product_id,
            description: format!("Product {}", product_id),
            delivering_plant_id: plant_id,
            unit_price: price,
        }
    }

    fn ready_draft(builder: &DraftOrderBuilder) -> DraftOrder {
        let (mut draft, _) = builder.create_on([], may_first());
        builder
            .set_receiving_plant(&mut draft, PlantRef::new(1, "P1"))
            .unwrap();
        builder
            .set_delivering_plant(&mut draft, PlantRef::new(2, "P2"))
            .unwrap();
        draft
    }

    #[test]
    fn test_create_without_orders_starts_at_one() {
        let builder = DraftOrderBuilder::new();
        let (draft, _) = builder.create(Vec::new());

        assert_eq!(draft.order_id(), 1);
        assert_eq!(draft.creation_date(), Local::now().date_naive());
    }

    #[test]
    fn test_create_uses_max_existing_id() {
        let (builder, metrics) = builder();
        let (draft, _) = builder.create_on([3, 7, 2], may_first());

        assert_eq!(draft.order_id(), 8);
        assert_eq!(metrics.drafts_started.get(), 1);
    }

    #[test]
    fn test_create_records_started_event() {
        let builder = DraftOrderBuilder::new();
        let (draft, changes) = builder.create_on([4], may_first());

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].sequence_number, 0);
        assert_eq!(changes[0].event_type, "DraftStarted");
        assert_eq!(changes[0].aggregate_id, 5);
        assert!(matches!(
            &changes[0].event_data,
            DraftEvent::Started(DraftStarted { order_id: 5, .. })
        ));
        assert_eq!(draft.version(), 0);
    }

    #[test]
    fn test_session_changes_replay_to_same_draft() {
        let builder = DraftOrderBuilder::new();
        let bolts = product(1, 2, dec!(10));
        let nuts = product(2, 2, dec!(4));

        let (mut draft, mut history) = builder.create_on([4], may_first());
        history.extend(
            builder
                .set_receiving_plant(&mut draft, PlantRef::new(1, "P1"))
                .unwrap(),
        );
        history.extend(
            builder
                .set_delivering_plant(&mut draft, PlantRef::new(2, "P2"))
                .unwrap(),
        );
        history.extend(builder.add_or_merge_line(&mut draft, &bolts, 2).unwrap());
        history.extend(builder.add_or_merge_line(&mut draft, &nuts, 1).unwrap());
        history.extend(builder.add_or_merge_line(&mut draft, &bolts, 3).unwrap());
        let (draft, removed) = builder.remove_lines(&draft, &BTreeSet::from([2]));
        history.extend(removed);

        let sequences: Vec<i64> = history.iter().map(|c| c.sequence_number).collect();
        assert_eq!(sequences, (0..history.len() as i64).collect::<Vec<_>>());

        let replayed = DraftOrder::load_from_events(history).unwrap();
        assert_eq!(replayed, draft);
        assert_eq!(replayed.line(1).unwrap().quantity(), 5);
    }

    #[test]
    fn test_add_without_delivering_plant_fails() {
        let (builder, metrics) = builder();
        let (mut draft, _) = builder.create_on([], may_first());
        let before = draft.clone();

        let result = builder.add_or_merge_line(&mut draft, &product(1, 2, dec!(10)), 2);

        assert!(matches!(result.unwrap_err(), DraftError::NoDeliveringPlant));
        assert_eq!(draft, before);
        assert_eq!(
            metrics.draft_rejections.with_label_values(&["no_delivering_plant"]).get(),
            1
        );
    }

    #[test]
    fn test_add_returns_numbered_changes() {
        let builder = DraftOrderBuilder::new();
        let mut draft = ready_draft(&builder);

        let changes = builder
            .add_or_merge_line(&mut draft, &product(1, 2, dec!(10)), 2)
            .unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].sequence_number, 3);
        assert_eq!(changes[0].event_type, "LineAdded");
        assert_eq!(changes[0].aggregate_id, draft.order_id());
    }

    #[test]
    fn test_remove_lines_is_idempotent_and_copy_on_write() {
        let builder = DraftOrderBuilder::new();
        let mut draft = ready_draft(&builder);
        builder
            .add_or_merge_line(&mut draft, &product(1, 2, dec!(10)), 2)
            .unwrap();
        builder
            .add_or_merge_line(&mut draft, &product(2, 2, dec!(4)), 1)
            .unwrap();

        let ids = BTreeSet::from([1]);
        let (once, removed) = builder.remove_lines(&draft, &ids);
        let (twice, removed_again) = builder.remove_lines(&once, &ids);

        assert_eq!(once, twice);
        assert_eq!(removed.len(), 1);
        assert!(removed_again.is_empty());
        assert_eq!(once.lines().len(), 1);
        assert_eq!(once.lines()[0].product_id(), 2);
        assert_eq!(draft.lines().len(), 2);
    }

    #[test]
    fn test_remove_absent_ids_is_noop() {
        let builder = DraftOrderBuilder::new();
        let mut draft = ready_draft(&builder);
        builder
            .add_or_merge_line(&mut draft, &product(1, 2, dec!(10)), 2)
            .unwrap();

        let (result, changes) = builder.remove_lines(&draft, &BTreeSet::from([42, 43]));
        assert_eq!(result, draft);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_validate_empty_order_only() {
        let (builder, metrics) = builder();
        let draft = ready_draft(&builder);

        let errors = builder.validate(&draft).unwrap_err();
        assert_eq!(errors.errors(), &[DraftError::EmptyOrder]);
        assert_eq!(metrics.draft_rejections.with_label_values(&["empty_order"]).get(), 1);
    }

    #[test]
    fn test_commit_incomplete_draft_fails() {
        let builder = DraftOrderBuilder::new();
        let (draft, _) = builder.create_on([], may_first());

        let errors = builder.commit(draft).unwrap_err();
        assert!(errors.contains(&DraftError::MissingReceivingPlant));
        assert!(errors.contains(&DraftError::MissingDeliveringPlant));
        assert!(errors.contains(&DraftError::EmptyOrder));
    }

    #[test]
    fn test_end_to_end_merge_and_commit() {
        let (builder, metrics) = builder();
        let mut draft = ready_draft(&builder);
        let product_a = product(100, 2, dec!(10));

        builder.add_or_merge_line(&mut draft, &product_a, 2).unwrap();
        builder.add_or_merge_line(&mut draft, &product_a, 3).unwrap();
        builder.validate(&draft).unwrap();

        let record = builder.commit(draft).unwrap();

        assert_eq!(record.receiving_plant.description, "P1");
        assert_eq!(record.delivering_plant.description, "P2");
        assert_eq!(record.lines.len(), 1);
        assert_eq!(record.lines[0].product_id, 100);
        assert_eq!(record.lines[0].quantity, 5);
        assert_eq!(record.lines[0].line_total, dec!(50));
        assert_eq!(record.total, dec!(50));
        assert_eq!(metrics.orders_committed.get(), 1);
        assert_eq!(metrics.draft_line_changes.with_label_values(&["merged"]).get(), 1);
    }
}
