//! CSV report files rendered from aggregated inventory data.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

use super::aggregator::{CategoryResult, InventoryReport};
use super::collector::{Column, Resource};
use super::registry::CollectorRegistry;

/// File carrying every category; the primary deliverable of a run.
pub const COMBINED_FILE: &str = "inventory.csv";

/// Machine-readable export, written on request alongside the CSV files.
pub const JSON_FILE: &str = "inventory.json";

pub struct ReportWriter {
    out_dir: PathBuf,
}

impl ReportWriter {
    /// Creating the writer creates the output directory. A failure here is
    /// a setup error and must abort the run before any collection is
    /// scheduled.
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self> {
        let out_dir = out_dir.into();
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;
        Ok(Self { out_dir })
    }

    /// Write one file per category plus the combined report.
    ///
    /// A per-category file failing to write is logged and skipped; the
    /// combined file failing is fatal.
    pub fn write(&self, report: &InventoryReport, registry: &CollectorRegistry) -> Result<()> {
        for category in report.categories.values() {
            let Some(collector) = registry.get(&category.category) else {
                continue;
            };
            let path = self.out_dir.join(format!("{}.csv", category.category));
            let body = render_category(category, &collector.columns());
            if let Err(e) = fs::write(&path, body) {
                error!("failed to write {}: {}", path.display(), e);
            }
        }

        let combined_path = self.out_dir.join(COMBINED_FILE);
        fs::write(&combined_path, render_combined(report, registry))
            .with_context(|| format!("failed to write combined report {}", combined_path.display()))?;

        info!("wrote inventory report to {}", self.out_dir.display());
        Ok(())
    }

    /// Full report as one JSON document: every category's rows plus the
    /// per-category error map. Treated like the combined file, so a write
    /// failure is fatal.
    pub fn write_json(&self, report: &InventoryReport) -> Result<()> {
        let categories: BTreeMap<&String, &Vec<Resource>> = report
            .categories
            .iter()
            .map(|(name, category)| (name, &category.resources))
            .collect();
        let failures: BTreeMap<&String, String> = report
            .failures
            .iter()
            .map(|(name, error)| (name, format!("{:#}", error)))
            .collect();

        let body = serde_json::json!({
            "categories": categories,
            "failures": failures,
        });

        let path = self.out_dir.join(JSON_FILE);
        fs::write(&path, serde_json::to_string_pretty(&body)?)
            .with_context(|| format!("failed to write JSON report {}", path.display()))?;
        Ok(())
    }
}

fn render_category(category: &CategoryResult, columns: &[Column]) -> String {
    let mut out = String::new();
    push_row(&mut out, columns.iter().map(|c| c.header.to_string()));
    for resource in &category.resources {
        push_row(&mut out, columns.iter().map(|c| c.extract(resource).to_string()));
    }
    out
}

/// Every category's header and rows in sorted category order, one blank
/// separator line between categories, none after the last.
pub fn render_combined(report: &InventoryReport, registry: &CollectorRegistry) -> String {
    let sections: Vec<String> = report
        .categories
        .values()
        .filter_map(|category| {
            registry
                .get(&category.category)
                .map(|collector| render_category(category, &collector.columns()))
        })
        .collect();

    sections.join("\n")
}

fn push_row<I>(out: &mut String, fields: I)
where
    I: IntoIterator<Item = String>,
{
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        out.push_str(&escape_csv(&field));
        first = false;
    }
    out.push('\n');
}

fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
