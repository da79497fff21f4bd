//! Bounded-parallelism fan-out over the (collector, region) matrix.
//!
//! Every pair becomes one independent task. Tasks race for permits on a
//! counting semaphore, so at most `max_concurrency` provider calls are in
//! flight at once, and each task delivers exactly one result into the
//! shared channel whether it succeeded or failed. Nothing short-circuits:
//! a failing task never cancels its siblings, and no task is retried.

use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, warn};

use super::collector::Resource;
use super::context::CollectionContext;
use super::registry::CollectorRegistry;

/// Concurrency width used when the configured value is unset or
/// non-positive.
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// Outcome of one (collector, region) task.
#[derive(Debug)]
pub struct CollectionResult {
    pub category: String,
    pub should_sort: bool,
    pub region: String,
    pub resources: anyhow::Result<Vec<Resource>>,
}

pub struct CollectionScheduler {
    max_concurrency: usize,
}

impl CollectionScheduler {
    pub fn new(max_concurrency: usize) -> Self {
        let max_concurrency = if max_concurrency == 0 {
            DEFAULT_MAX_CONCURRENCY
        } else {
            max_concurrency
        };
        Self { max_concurrency }
    }

    /// Size of the task matrix, known up front so the result channel can be
    /// sized to hold every result without blocking producers.
    pub fn task_count(registry: &CollectorRegistry, regions: &[String]) -> usize {
        registry.len() * regions.len()
    }

    /// Execute every (collector, region) pair, sending one
    /// [`CollectionResult`] per task into `results`.
    ///
    /// Returns once every task has finished; the sender is dropped on
    /// return, which is what terminates the consumer's receive loop.
    pub async fn run(
        &self,
        registry: &CollectorRegistry,
        regions: &[String],
        ctx: Arc<CollectionContext>,
        results: mpsc::Sender<CollectionResult>,
    ) {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = FuturesUnordered::new();

        for collector in registry.iter() {
            for region in regions {
                let collector = collector.clone();
                let region = region.clone();
                let ctx = ctx.clone();
                let semaphore = semaphore.clone();
                let results = results.clone();

                tasks.push(async move {
                    let permit = match semaphore.acquire().await {
                        Ok(permit) => permit,
                        Err(_) => {
                            warn!("semaphore closed, aborting {}:{}", collector.name(), region);
                            return;
                        }
                    };

                    debug!("collecting {} in {}", collector.name(), region);
                    let resources = collector.collect(&ctx, &region).await;
                    drop(permit);

                    if let Err(e) = &resources {
                        error!("collection failed for {} in {}: {:#}", collector.name(), region, e);
                    }

                    let result = CollectionResult {
                        category: collector.name().to_string(),
                        should_sort: collector.should_sort(),
                        region: region.clone(),
                        resources,
                    };

                    if results.send(result).await.is_err() {
                        warn!(
                            "result channel closed before {}:{} could report",
                            collector.name(),
                            region
                        );
                    }
                });
            }
        }

        let total = tasks.len();
        info!(
            "executing {} collection tasks with max concurrency {}",
            total, self.max_concurrency
        );

        let mut completed = 0;
        while tasks.next().await.is_some() {
            completed += 1;
            debug!("{}/{} collection tasks completed", completed, total);
        }
    }
}
