//! AWS API interaction module
//!
//! This module provides the core functionality for talking to AWS:
//! session loading, identity verification, region-scoped clients and the
//! account's region directory.
//!
//! # Module Structure
//!
//! - [`auth`] - Standard credential chain session and STS identity check
//! - [`client`] - Region-scoped SDK clients and error formatting
//! - [`regions`] - Region listing with fallback
//!
//! # Example
//!
//! ```ignore
//! use crate::aws::{auth::AwsSession, client::AwsClient, regions};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = AwsClient::new(AwsSession::load(None).await);
//!     let regions = regions::resolve_regions(&client, "us-east-1", None).await;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod regions;
