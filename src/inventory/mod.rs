//! Concurrent collection-and-aggregation engine.
//!
//! One run: resolve the region set, fan (collector, region) tasks out
//! under bounded parallelism, aggregate per-category results while
//! isolating partial failures, then render CSV reports.

pub mod aggregator;
pub mod arn;
pub mod collector;
pub mod collectors;
pub mod config;
pub mod context;
pub mod credentials;
pub mod engine;
pub mod names;
pub mod output;
pub mod regions;
pub mod registry;
pub mod scheduler;

pub use aggregator::{CategoryResult, InventoryReport, ResultAggregator};
pub use arn::{resource_name, Arn};
pub use collector::{Collector, Column, ColumnField, Resource};
pub use config::Config;
pub use context::CollectionContext;
pub use credentials::CredentialCoordinator;
pub use engine::collect_inventory;
pub use names::{NameKind, NameResolutionCache, NameSource, SdkNameSource, NOT_AVAILABLE};
pub use output::ReportWriter;
pub use regions::{resolve_regions, GLOBAL_REGION};
pub use registry::CollectorRegistry;
pub use scheduler::{CollectionResult, CollectionScheduler, DEFAULT_MAX_CONCURRENCY};
