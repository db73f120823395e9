use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{NaiveDateTime, NaiveTime};

use crate::domain::order::{OrderId, OrderRecord, OrderSummary};
use crate::metrics::Metrics;

use super::criteria::{DayRange, FilterCriteria, OrderIdQuery};

/// The fields of an order that filtering looks at
pub trait OrderFacts {
    fn order_id(&self) -> OrderId;
    /// Local wall-clock creation time
    fn created_at(&self) -> NaiveDateTime;
    fn status_code(&self) -> &str;
}

impl OrderFacts for OrderSummary {
    fn order_id(&self) -> OrderId {
        self.order_id
    }

    fn created_at(&self) -> NaiveDateTime {
        self.creation_date
    }

    fn status_code(&self) -> &str {
        self.status_code.as_code()
    }
}

impl OrderFacts for OrderRecord {
    fn order_id(&self) -> OrderId {
        self.order_id
    }

    fn created_at(&self) -> NaiveDateTime {
        self.creation_date.and_time(NaiveTime::MIN)
    }

    fn status_code(&self) -> &str {
        self.status_code.as_code()
    }
}

/// Criteria parsed once per run
struct CompiledCriteria<'a> {
    order_id: OrderIdQuery,
    day: Option<DayRange>,
    status_codes: &'a BTreeSet<String>,
}

impl<'a> CompiledCriteria<'a> {
    fn compile(criteria: &'a FilterCriteria) -> Self {
        Self {
            order_id: criteria.order_id_query(),
            day: criteria.day_range(),
            status_codes: &criteria.status_codes,
        }
    }

    fn matches<T: OrderFacts>(&self, order: &T) -> bool {
        self.order_id.matches(order.order_id())
            && self.day.map_or(true, |day| day.contains(order.created_at()))
            && (self.status_codes.is_empty() || self.status_codes.contains(order.status_code()))
    }
}

/// Stateless evaluator of [`FilterCriteria`] over an order collection
#[derive(Clone, Default)]
pub struct OrderFilterEngine {
    metrics: Option<Arc<Metrics>>,
}

impl OrderFilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(metrics: Arc<Metrics>) -> Self {
        Self {
            metrics: Some(metrics),
        }
    }

    /// Whether `order` satisfies every active criterion category
    pub fn matches<T: OrderFacts>(&self, order: &T, criteria: &FilterCriteria) -> bool {
        CompiledCriteria::compile(criteria).matches(order)
    }

    /// Matching orders in their original relative order. The input is left untouched.
    pub fn filter<T: OrderFacts + Clone>(&self, orders: &[T], criteria: &FilterCriteria) -> Vec<T> {
        let compiled = CompiledCriteria::compile(criteria);
        let matched: Vec<T> = orders
            .iter()
            .filter(|order| compiled.matches(*order))
            .cloned()
            .collect();

        if let Some(metrics) = &self.metrics {
            metrics.record_filter_run(matched.len());
        }
        tracing::debug!(
            total = orders.len(),
            matched = matched.len(),
            order_id_text = %criteria.order_id_text,
            date = ?criteria.date,
            status_codes = ?criteria.status_codes,
            "Orders filtered"
        );

        matched
    }

    /// Copy of `orders` without the given ids, in their original relative
    /// order. Ids not in the list are ignored and the input is left untouched.
    pub fn remove_orders<T: OrderFacts + Clone>(
        &self,
        orders: &[T],
        order_ids: &BTreeSet<OrderId>,
    ) -> Vec<T> {
        let kept: Vec<T> = orders
            .iter()
            .filter(|order| !order_ids.contains(&order.order_id()))
            .cloned()
            .collect();

        tracing::debug!(
            total = orders.len(),
            removed = orders.len() - kept.len(),
            "Orders removed from list"
        );

        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{PlantRef, StatusCode};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn order(order_id: OrderId, created: &str, status: &str) -> OrderSummary {
        OrderSummary {
            order_id,
            creation_date: NaiveDateTime::parse_from_str(created, "%Y-%m-%d %H:%M:%S").unwrap(),
            receiving_plant_id: None,
            delivering_plant_id: None,
            status_code: StatusCode::from(status),
        }
    }

    fn orders() -> Vec<OrderSummary> {
        vec![
            order(12, "2024-05-01 08:15:00", "CR"),
            order(2, "2024-05-01 23:59:59", "RL"),
            order(21, "2024-04-30 23:59:59", "CR"),
            order(112, "2024-05-02 00:00:00", "XX"),
            order(7, "2024-05-01 00:00:00", "RL"),
        ]
    }

    fn ids(orders: &[OrderSummary]) -> Vec<OrderId> {
        orders.iter().map(|o| o.order_id).collect()
    }

    #[test]
    fn test_empty_criteria_is_identity() {
        let engine = OrderFilterEngine::new();
        let all = orders();

        assert_eq!(engine.filter(&all, &FilterCriteria::new()), all);
    }

    #[test]
    fn test_all_digit_text_matches_exact_id() {
        let engine = OrderFilterEngine::new();
        let result = engine.filter(&orders(), &FilterCriteria::new().with_order_id_text("12"));

        assert_eq!(ids(&result), vec![12]);
    }

    #[test]
    fn test_single_digit_is_exact_not_substring() {
        let engine = OrderFilterEngine::new();
        let result = engine.filter(&orders(), &FilterCriteria::new().with_order_id_text("2"));

        assert_eq!(ids(&result), vec![2]);
    }

    #[test]
    fn test_non_numeric_text_matches_substring() {
        let engine = OrderFilterEngine::new();
        let negative = vec![order(-21, "2024-05-01 08:00:00", "CR"), order(-3, "2024-05-01 08:00:00", "CR")];

        let result = engine.filter(&negative, &FilterCriteria::new().with_order_id_text("-2"));
        assert_eq!(ids(&result), vec![-21]);

        let none = engine.filter(&orders(), &FilterCriteria::new().with_order_id_text("2a"));
        assert!(none.is_empty());
    }

    #[test]
    fn test_date_matches_whole_calendar_day() {
        let engine = OrderFilterEngine::new();
        let criteria = FilterCriteria::new().with_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());

        let result = engine.filter(&orders(), &criteria);
        assert_eq!(ids(&result), vec![12, 2, 7]);
    }

    #[test]
    fn test_statuses_combine_with_or() {
        let engine = OrderFilterEngine::new();
        let criteria = FilterCriteria::new().with_status("CR").with_status("RL");

        let result = engine.filter(&orders(), &criteria);
        assert_eq!(ids(&result), vec![12, 2, 21, 7]);
    }

    #[test]
    fn test_unknown_status_codes_are_matchable() {
        let engine = OrderFilterEngine::new();
        let result = engine.filter(&orders(), &FilterCriteria::new().with_status("XX"));

        assert_eq!(ids(&result), vec![112]);
    }

    #[test]
    fn test_categories_combine_with_and() {
        let engine = OrderFilterEngine::new();
        let criteria = FilterCriteria::new()
            .with_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
            .with_status("RL");

        assert_eq!(ids(&engine.filter(&orders(), &criteria)), vec![2, 7]);

        let narrowed = criteria.with_order_id_text("7");
        assert_eq!(ids(&engine.filter(&orders(), &narrowed)), vec![7]);
    }

    #[test]
    fn test_matches_single_order() {
        let engine = OrderFilterEngine::new();
        let target = order(12, "2024-05-01 08:15:00", "CR");

        assert!(engine.matches(&target, &FilterCriteria::new().with_status("CR")));
        assert!(!engine.matches(&target, &FilterCriteria::new().with_status("RL")));
    }

    #[test]
    fn test_filter_committed_records() {
        let engine = OrderFilterEngine::new();
        let record = OrderRecord {
            order_id: 9,
            creation_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            receiving_plant: PlantRef::new(1, "P1"),
            delivering_plant: PlantRef::new(2, "P2"),
            status_code: StatusCode::Created,
            lines: vec![],
            total: Decimal::ZERO,
        };

        let criteria = FilterCriteria::new()
            .with_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
            .with_order_id_text("9");
        assert_eq!(engine.filter(&[record], &criteria).len(), 1);
    }

    #[test]
    fn test_remove_orders_keeps_the_rest_in_order() {
        let engine = OrderFilterEngine::new();
        let all = orders();

        let kept = engine.remove_orders(&all, &BTreeSet::from([2, 112, 999]));

        assert_eq!(ids(&kept), vec![12, 21, 7]);
        assert_eq!(all.len(), 5);
        assert_eq!(engine.remove_orders(&kept, &BTreeSet::from([2])), kept);
    }

    #[test]
    fn test_filter_records_metrics() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let engine = OrderFilterEngine::with_metrics(metrics.clone());

        engine.filter(&orders(), &FilterCriteria::new().with_status("RL"));

        assert_eq!(metrics.filter_runs.get(), 1);
        assert_eq!(metrics.filter_matches.get(), 2);
    }
}
