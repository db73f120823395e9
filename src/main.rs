use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use order_desk::domain::catalog::ReferenceData;
use order_desk::domain::order::{DraftOrder, DraftOrderBuilder};
use order_desk::event_sourcing::{serialize_event, Aggregate};
use order_desk::filter::{FilterCriteria, OrderFilterEngine};
use order_desk::metrics::Metrics;
use order_desk::providers::{MockData, MockDataService, OrderCollectionProvider, PersistenceSink};
use order_desk::settings;
use order_desk::utils::{retry_on_transient, retry_with_backoff, RetryConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = settings::load_config().context("Failed to load settings")?;

    // RUST_LOG wins over the configured filter
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    tracing::info!("Starting order desk session");

    // === 1. Data service ===
    let data = match &config.seed_data_path {
        Some(path) => MockData::from_json_file(path)?,
        None => MockData::sample()?,
    };
    let service = Arc::new(MockDataService::new(data));
    service.fail_next(config.mock_transient_failures);

    let metrics = Arc::new(Metrics::new()?);
    let retry = RetryConfig::from(&config.retry);

    // === 2. Reference data and existing order ids ===
    let reference = retry_on_transient(&retry, "reference_data", |attempt| {
        metrics.record_retry_attempt("reference_data", attempt);
        let service = service.clone();
        async move { service.reference_data().await }
    })
    .await;
    let reference: ReferenceData = metrics.record_retry_result("reference_data", reference)?;

    let order_ids = retry_on_transient(&retry, "order_ids", |attempt| {
        metrics.record_retry_attempt("order_ids", attempt);
        let service = service.clone();
        async move { service.order_ids().await }
    })
    .await;
    let order_ids = metrics.record_retry_result("order_ids", order_ids)?;

    tracing::info!(
        receiving_plants = reference.receiving_plants.plants().len(),
        delivering_plants = reference.delivering_plants.plants().len(),
        products = reference.products.entries().len(),
        orders = order_ids.len(),
        "Reference data loaded"
    );

    // === 3. Compose a draft ===
    let builder = DraftOrderBuilder::with_metrics(metrics.clone());
    let (mut draft, mut history) = builder.create(order_ids.iter().copied());

    let receiving = reference.receiving_plants.resolve(1000, Some("Hamburg Receiving"))?;
    let delivering = reference.delivering_plants.resolve(2000, None)?;
    history.extend(builder.set_receiving_plant(&mut draft, receiving)?);
    history.extend(builder.set_delivering_plant(&mut draft, delivering.clone())?);

    let offered = reference.products.for_delivering_plant(delivering.id);
    tracing::info!(plant = %delivering.description, products = offered.len(), "Products offered");

    for (product_id, quantity) in [(501, 120), (502, 120), (501, 30), (503, 1)] {
        let product = reference.products.find(product_id)?;
        history.extend(builder.add_or_merge_line(&mut draft, product, quantity)?);
    }

    // Out-of-plant product is refused and leaves the draft unchanged
    if let Err(e) = builder.add_or_merge_line(&mut draft, reference.products.find(601)?, 1) {
        tracing::info!(error = %e, "Product refused as expected");
    }

    let (draft, removed) = builder.remove_lines(&draft, &BTreeSet::from([503]));
    history.extend(removed);
    builder.validate(&draft)?;

    for change in &history {
        let event = serialize_event(&change.event_data)?;
        tracing::debug!(seq = change.sequence_number, %event, "Draft history");
    }

    let replayed = DraftOrder::load_from_events(history)?;
    anyhow::ensure!(replayed == draft, "Draft history does not replay to the current draft");

    // === 4. Commit and submit ===
    let record = builder.commit(draft)?;
    let ack = retry_on_transient(&retry, "submit_order", |attempt| {
        metrics.record_retry_attempt("submit_order", attempt);
        let service = service.clone();
        let record = record.clone();
        async move { service.submit(record).await }
    })
    .await;

    match metrics.record_retry_result("submit_order", ack) {
        Ok(ack) => {
            tracing::info!(order_id = ack.order_id, receipt_id = %ack.receipt_id, "Order submitted");
        }
        Err(e) => {
            tracing::error!(order_id = record.order_id, error = %e, "Order submission failed");
            return Err(e.into());
        }
    }

    // === 5. Search the order list ===
    let orders = retry_with_backoff(&retry, "orders", |attempt| {
        metrics.record_retry_attempt("orders", attempt);
        let service = service.clone();
        async move { service.orders().await }
    })
    .await;
    let orders = metrics.record_retry_result("orders", orders)?;
    let engine = OrderFilterEngine::with_metrics(metrics.clone());

    let searches = [
        ("all", FilterCriteria::new()),
        ("created today", FilterCriteria::new().with_date(Local::now().date_naive())),
        ("order 12", FilterCriteria::new().with_order_id_text("12")),
        ("created or released", FilterCriteria::new().with_status("CR").with_status("RL")),
    ];

    for (name, criteria) in &searches {
        let matched = engine.filter(&orders, criteria);
        tracing::info!(search = name, matched = matched.len(), "Search finished");

        for order in &matched {
            tracing::info!(
                order_id = order.order_id,
                created = %order.creation_date.date(),
                status = %order.status_code,
                receiving_plant = reference.receiving_plants.description_for(order.receiving_plant_id),
                "  match"
            );
        }
    }

    // Hiding orders from the list leaves the stored collection alone
    let visible = engine.remove_orders(&orders, &BTreeSet::from([1]));
    tracing::info!(listed = orders.len(), visible = visible.len(), "Orders hidden from list");

    if let Some(detail) = service.order_detail(record.order_id).await? {
        tracing::info!(order_id = detail.order_id, lines = detail.lines.len(), total = %detail.total, "Stored order");
    }

    tracing::debug!("Session metrics:\n{}", metrics.render()?);
    tracing::info!("Order desk session complete");

    Ok(())
}
