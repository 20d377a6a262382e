//! Resource abstraction layer
//!
//! This module provides a data-driven approach to listing AWS resources.
//! Listing definitions are loaded from JSON embedded at compile time, so the
//! pagination details of each service live in one place.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches resource definitions from embedded JSON
//! - [`fetcher`] - Fetches resources page by page and describes identifiers in batches
//! - [`sdk_dispatch`] - Maps abstract SDK method names to concrete AWS SDK calls
//!
//! # Example
//!
//! ```ignore
//! use crate::resource::{fetch_resources, EC2_INSTANCES};
//!
//! async fn list_vms(dispatch: &dyn SdkDispatch) -> anyhow::Result<Vec<serde_json::Value>> {
//!     fetch_resources(EC2_INSTANCES, dispatch, "eu-west-1").await
//! }
//! ```

mod fetcher;
mod registry;
pub mod sdk_dispatch;

pub use fetcher::{
    describe_in_batches, extract_items, fetch_resources, fetch_resources_paginated, i64_at,
    lookup, resource_def, str_at, PaginatedResult,
};
pub use registry::*;
pub use sdk_dispatch::SdkDispatch;
