//! Collector capability surface and the normalized resource record.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::context::CollectionContext;

/// Number of nested sub-category labels a resource row can carry. Used to
/// render parent/child hierarchies (load balancer -> listener -> rule).
pub const SUB_CATEGORY_LEVELS: usize = 3;

/// One normalized inventory row. All values are display strings; the
/// collector that creates a resource owns it, everything downstream treats
/// it as read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub category: String,
    pub sub_categories: [String; SUB_CATEGORY_LEVELS],
    pub name: String,
    pub region: String,
    pub arn: String,
    pub attrs: BTreeMap<String, String>,
    /// When this row was fetched. Region snapshots are independently
    /// timestamped; there is no cross-region consistency.
    pub collected_at: DateTime<Utc>,
}

impl Resource {
    pub fn new(category: &str, name: impl Into<String>, region: &str) -> Self {
        Self {
            category: category.to_string(),
            sub_categories: Default::default(),
            name: name.into(),
            region: region.to_string(),
            arn: String::new(),
            attrs: BTreeMap::new(),
            collected_at: Utc::now(),
        }
    }

    pub fn with_arn(mut self, arn: impl Into<String>) -> Self {
        self.arn = arn.into();
        self
    }

    /// Set one of the nested sub-category labels. `level` must be below
    /// [`SUB_CATEGORY_LEVELS`].
    pub fn with_sub_category(mut self, level: usize, label: impl Into<String>) -> Self {
        self.sub_categories[level] = label.into();
        self
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    /// Tie-break chain for deterministic per-category ordering.
    pub fn sort_key(&self) -> (&str, &str, &str, &str, &str) {
        (
            &self.region,
            &self.sub_categories[0],
            &self.sub_categories[1],
            &self.sub_categories[2],
            &self.name,
        )
    }
}

/// Which field of a [`Resource`] a report column reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnField {
    Name,
    Region,
    Arn,
    SubCategory(usize),
    Attr(&'static str),
}

/// One report column: header plus the field it extracts.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub header: &'static str,
    pub field: ColumnField,
}

impl Column {
    pub const fn new(header: &'static str, field: ColumnField) -> Self {
        Self { header, field }
    }

    pub fn extract<'a>(&self, resource: &'a Resource) -> &'a str {
        match self.field {
            ColumnField::Name => &resource.name,
            ColumnField::Region => &resource.region,
            ColumnField::Arn => &resource.arn,
            ColumnField::SubCategory(level) => resource
                .sub_categories
                .get(level)
                .map(String::as_str)
                .unwrap_or(""),
            ColumnField::Attr(key) => resource
                .attrs
                .get(key)
                .map(String::as_str)
                .unwrap_or(""),
        }
    }
}

/// One inventoried resource category.
///
/// The scheduler only ever calls [`Collector::collect`]; the remaining
/// operations describe the category to the aggregator and the renderer.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Stable category key. Doubles as the per-category report file stem.
    fn name(&self) -> &'static str;

    /// Whether the aggregator imposes the tie-break ordering on this
    /// category. Collectors that emit parent/child rows keep provider
    /// ordering instead.
    fn should_sort(&self) -> bool {
        true
    }

    /// Report columns, in output order.
    fn columns(&self) -> Vec<Column>;

    /// Enumerate this category's resources in one region.
    async fn collect(&self, ctx: &CollectionContext, region: &str) -> Result<Vec<Resource>>;
}
