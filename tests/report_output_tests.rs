//! Report Writer Tests
//!
//! Verifies the persisted output layout:
//!
//! - One CSV file per category plus the combined report
//! - Combined report separates categories with exactly one blank line and
//!   has none after the last category
//! - A per-category file failing to write is skipped without failing the
//!   run; the combined file failing is fatal

use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use std::sync::Arc;

use awsinv::inventory::{
    CategoryResult, CollectionContext, Collector, CollectorRegistry, Column, ColumnField,
    InventoryReport, ReportWriter, Resource,
};
use pretty_assertions::assert_eq;

struct StaticCollector(&'static str);

#[async_trait]
impl Collector for StaticCollector {
    fn name(&self) -> &'static str {
        self.0
    }

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::new("Name", ColumnField::Name),
            Column::new("Region", ColumnField::Region),
            Column::new("State", ColumnField::Attr("State")),
        ]
    }

    async fn collect(&self, _ctx: &CollectionContext, _region: &str) -> Result<Vec<Resource>> {
        Ok(Vec::new())
    }
}

fn registry() -> CollectorRegistry {
    let mut registry = CollectorRegistry::new();
    registry.register(Arc::new(StaticCollector("bucket")));
    registry.register(Arc::new(StaticCollector("instance")));
    registry
}

fn report() -> InventoryReport {
    let mut report = InventoryReport::default();
    report.categories.insert(
        "instance".to_string(),
        CategoryResult {
            category: "instance".to_string(),
            should_sort: true,
            resources: vec![
                Resource::new("instance", "web-1", "us-east-1").with_attr("State", "running"),
                Resource::new("instance", "web,2", "eu-west-1").with_attr("State", "stopped"),
            ],
        },
    );
    report.categories.insert(
        "bucket".to_string(),
        CategoryResult {
            category: "bucket".to_string(),
            should_sort: true,
            resources: vec![Resource::new("bucket", "logs", "global")],
        },
    );
    report
}

#[test]
fn test_per_category_files_and_combined_layout() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ReportWriter::new(dir.path()).unwrap();

    writer.write(&report(), &registry()).unwrap();

    let bucket = fs::read_to_string(dir.path().join("bucket.csv")).unwrap();
    assert_eq!(bucket, "Name,Region,State\nlogs,global,\n");

    let instance = fs::read_to_string(dir.path().join("instance.csv")).unwrap();
    assert_eq!(
        instance,
        "Name,Region,State\nweb-1,us-east-1,running\n\"web,2\",eu-west-1,stopped\n"
    );

    // Combined: categories in sorted order, one blank separator line
    // between them, none after the last.
    let combined = fs::read_to_string(dir.path().join("inventory.csv")).unwrap();
    assert_eq!(
        combined,
        "Name,Region,State\nlogs,global,\n\
         \n\
         Name,Region,State\nweb-1,us-east-1,running\n\"web,2\",eu-west-1,stopped\n"
    );
    assert!(!combined.ends_with("\n\n"));
}

#[test]
fn test_category_without_registered_collector_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ReportWriter::new(dir.path()).unwrap();

    let mut orphaned = report();
    orphaned.categories.insert(
        "mystery".to_string(),
        CategoryResult {
            category: "mystery".to_string(),
            should_sort: true,
            resources: vec![Resource::new("mystery", "x", "us-east-1")],
        },
    );

    writer.write(&orphaned, &registry()).unwrap();

    assert!(!dir.path().join("mystery.csv").exists());
    assert!(dir.path().join("bucket.csv").exists());
}

#[test]
fn test_blocked_category_file_does_not_fail_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ReportWriter::new(dir.path()).unwrap();

    // A directory squatting on the category file path makes its write
    // fail; the run continues and the combined report still lands.
    fs::create_dir(dir.path().join("bucket.csv")).unwrap();

    writer.write(&report(), &registry()).unwrap();

    assert!(dir.path().join("instance.csv").exists());
    assert!(dir.path().join("inventory.csv").exists());
}

#[test]
fn test_blocked_combined_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ReportWriter::new(dir.path()).unwrap();

    fs::create_dir(dir.path().join("inventory.csv")).unwrap();

    let err = writer.write(&report(), &registry()).unwrap_err();
    assert!(err.to_string().contains("combined report"));
}

#[test]
fn test_json_export_carries_rows_and_failures() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ReportWriter::new(dir.path()).unwrap();

    let mut with_failure = report();
    with_failure
        .failures
        .insert("instance".to_string(), anyhow::anyhow!("throttled"));

    writer.write_json(&with_failure).unwrap();

    let body: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("inventory.json")).unwrap())
            .unwrap();
    assert_eq!(body["failures"]["instance"], "throttled");
    assert_eq!(body["categories"]["bucket"][0]["name"], "logs");
    assert_eq!(body["categories"]["instance"][1]["attrs"]["State"], "stopped");
}

#[test]
fn test_writer_creates_nested_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("reports").join("aws");

    ReportWriter::new(&nested).unwrap();

    assert!(nested.is_dir());
}
