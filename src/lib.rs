#![warn(clippy::all, rust_2018_idioms)]

//! awsinv - Concurrent AWS Resource Inventory
//!
//! awsinv enumerates AWS resources across many categories and regions in
//! one bounded collection pass and writes CSV reports.
//!
//! # Architecture Overview
//!
//! - **Region resolution** ([`inventory::regions`]): the user-supplied
//!   region list is normalized once and fixed for the run; the `global`
//!   pseudo-region carries account-wide categories (IAM, S3).
//! - **Fan-out** ([`inventory::scheduler`]): every (collector, region) pair
//!   runs as an independent task gated by a counting semaphore, so a slow
//!   or failing provider call never stalls or cancels its siblings.
//! - **Aggregation** ([`inventory::aggregator`]): a single consumer drains
//!   the result channel, merging per-region rows per category and keeping
//!   per-category failures separate, then sorts for reproducible output.
//! - **Name resolution** ([`inventory::names`]): identifier-to-name lookups
//!   are amortized with one bulk list call per (region, kind), cached for
//!   the rest of the run.
//! - **Collectors** ([`inventory::collectors`]): one module per service,
//!   mapping list/describe responses into normalized display rows.
//!
//! Collection is best-effort: a category that fails in one region can still
//! report rows from the regions that succeeded, and the run exits non-zero
//! carrying the per-category error map.

pub mod inventory;
