//! Run driver: wires the scheduler fan-out to the single aggregating
//! consumer.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use super::aggregator::{InventoryReport, ResultAggregator};
use super::context::CollectionContext;
use super::registry::CollectorRegistry;
use super::scheduler::{CollectionResult, CollectionScheduler};

/// Execute one full collection pass and aggregate the results.
///
/// The result channel is sized to the task count, so producers never block
/// on a slow consumer; the scheduler dropping its sender is what ends the
/// aggregator's drain loop.
pub async fn collect_inventory(
    registry: &CollectorRegistry,
    regions: &[String],
    ctx: Arc<CollectionContext>,
    max_concurrency: usize,
) -> InventoryReport {
    let task_count = CollectionScheduler::task_count(registry, regions);
    let (results_tx, mut results_rx) = mpsc::channel::<CollectionResult>(task_count.max(1));

    let scheduler = CollectionScheduler::new(max_concurrency);
    let mut aggregator = ResultAggregator::new();

    tokio::join!(
        scheduler.run(registry, regions, ctx, results_tx),
        aggregator.drain(&mut results_rx),
    );

    let report = aggregator.finish();
    info!(
        "collected {} resources across {} categories ({} failed)",
        report.resource_count(),
        report.categories.len(),
        report.failures.len()
    );
    report
}
