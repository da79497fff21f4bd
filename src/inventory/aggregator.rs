//! Single-consumer aggregation of collection results.
//!
//! Results arrive in completion order, which is non-deterministic; the
//! aggregator is the only writer of the two output maps, so no locking is
//! needed, and determinism is reintroduced at the end by sorting.

use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::debug;

use super::collector::Resource;
use super::scheduler::CollectionResult;

/// All successful rows for one category, across every region.
#[derive(Debug)]
pub struct CategoryResult {
    pub category: String,
    pub should_sort: bool,
    pub resources: Vec<Resource>,
}

/// Final outcome of a collection run.
///
/// A category can appear in both maps at once: data from regions that
/// succeeded, plus the last error observed from a region that failed.
/// Earlier errors for the same category are overwritten.
#[derive(Debug, Default)]
pub struct InventoryReport {
    pub categories: BTreeMap<String, CategoryResult>,
    pub failures: BTreeMap<String, anyhow::Error>,
}

impl InventoryReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// True when nothing at all was collected, distinguishing total from
    /// partial failure.
    pub fn is_empty(&self) -> bool {
        self.categories.values().all(|c| c.resources.is_empty())
    }

    pub fn resource_count(&self) -> usize {
        self.categories.values().map(|c| c.resources.len()).sum()
    }
}

#[derive(Default)]
pub struct ResultAggregator {
    categories: BTreeMap<String, CategoryResult>,
    failures: BTreeMap<String, anyhow::Error>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one task result into the maps. Success appends to the
    /// category's rows; failure records the error, last writer wins.
    pub fn record(&mut self, result: CollectionResult) {
        match result.resources {
            Ok(resources) => {
                debug!(
                    "{} rows for {} from {}",
                    resources.len(),
                    result.category,
                    result.region
                );
                self.categories
                    .entry(result.category.clone())
                    .or_insert_with(|| CategoryResult {
                        category: result.category,
                        should_sort: result.should_sort,
                        resources: Vec::new(),
                    })
                    .resources
                    .extend(resources);
            }
            Err(e) => {
                self.failures.insert(result.category, e);
            }
        }
    }

    /// Receive until the scheduler drops its sender.
    pub async fn drain(&mut self, results: &mut mpsc::Receiver<CollectionResult>) {
        while let Some(result) = results.recv().await {
            self.record(result);
        }
    }

    /// Impose deterministic ordering and produce the report. Categories
    /// iterate lexicographically; rows are sorted by (region, sub-category
    /// labels, name) for collectors that opted in.
    pub fn finish(mut self) -> InventoryReport {
        for category in self.categories.values_mut() {
            if category.should_sort {
                category.resources.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
            }
        }

        InventoryReport {
            categories: self.categories,
            failures: self.failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn ok_result(category: &str, region: &str, names: &[&str]) -> CollectionResult {
        CollectionResult {
            category: category.to_string(),
            should_sort: true,
            region: region.to_string(),
            resources: Ok(names
                .iter()
                .map(|n| Resource::new(category, *n, region))
                .collect()),
        }
    }

    fn err_result(category: &str, region: &str, message: &str) -> CollectionResult {
        CollectionResult {
            category: category.to_string(),
            should_sort: true,
            region: region.to_string(),
            resources: Err(anyhow!("{}", message)),
        }
    }

    #[test]
    fn test_success_merges_across_regions() {
        let mut aggregator = ResultAggregator::new();
        aggregator.record(ok_result("ec2-instance", "us-east-1", &["a", "b"]));
        aggregator.record(ok_result("ec2-instance", "eu-west-1", &["c"]));

        let report = aggregator.finish();

        assert_eq!(report.categories.len(), 1);
        assert_eq!(report.categories["ec2-instance"].resources.len(), 3);
        assert!(!report.has_failures());
    }

    #[test]
    fn test_category_in_both_maps_on_partial_failure() {
        let mut aggregator = ResultAggregator::new();
        aggregator.record(ok_result("ec2-instance", "us-east-1", &["a"]));
        aggregator.record(err_result("ec2-instance", "eu-west-1", "throttled"));

        let report = aggregator.finish();

        assert_eq!(report.categories["ec2-instance"].resources.len(), 1);
        assert!(report.failures.contains_key("ec2-instance"));
        assert!(!report.is_empty());
    }

    #[test]
    fn test_last_error_wins() {
        let mut aggregator = ResultAggregator::new();
        aggregator.record(err_result("s3-bucket", "us-east-1", "first"));
        aggregator.record(err_result("s3-bucket", "eu-west-1", "second"));

        let report = aggregator.finish();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures["s3-bucket"].to_string(), "second");
    }

    #[test]
    fn test_sorting_by_tie_break_chain() {
        let mut rows = vec![
            Resource::new("c", "beta", "us-east-1"),
            Resource::new("c", "alpha", "us-east-1").with_sub_category(0, "x"),
            Resource::new("c", "alpha", "eu-west-1"),
            Resource::new("c", "alpha", "us-east-1"),
        ];

        let mut aggregator = ResultAggregator::new();
        aggregator.record(CollectionResult {
            category: "c".to_string(),
            should_sort: true,
            region: "mixed".to_string(),
            resources: Ok(rows.drain(..).collect()),
        });

        let report = aggregator.finish();
        let sorted: Vec<(&str, &str, &str)> = report.categories["c"]
            .resources
            .iter()
            .map(|r| (r.region.as_str(), r.sub_categories[0].as_str(), r.name.as_str()))
            .collect();

        assert_eq!(
            sorted,
            vec![
                ("eu-west-1", "", "alpha"),
                ("us-east-1", "", "alpha"),
                ("us-east-1", "", "beta"),
                ("us-east-1", "x", "alpha"),
            ]
        );
    }

    #[test]
    fn test_unsorted_category_preserves_arrival_order() {
        let mut aggregator = ResultAggregator::new();
        aggregator.record(CollectionResult {
            category: "load-balancer".to_string(),
            should_sort: false,
            region: "us-east-1".to_string(),
            resources: Ok(vec![
                Resource::new("load-balancer", "zeta", "us-east-1"),
                Resource::new("load-balancer", "alpha", "us-east-1"),
            ]),
        });

        let report = aggregator.finish();
        let names: Vec<&str> = report.categories["load-balancer"]
            .resources
            .iter()
            .map(|r| r.name.as_str())
            .collect();

        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_empty_report_detection() {
        let mut aggregator = ResultAggregator::new();
        aggregator.record(err_result("s3-bucket", "us-east-1", "denied"));
        aggregator.record(ok_result("ec2-instance", "us-east-1", &[]));

        let report = aggregator.finish();

        assert!(report.is_empty());
        assert!(report.has_failures());
        assert_eq!(report.resource_count(), 0);
    }
}
