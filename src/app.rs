//! Inventory run
//!
//! Drives one scan from identity check to written workbook. Everything is
//! awaited in sequence: identity, regions, the five collectors, the report.

use crate::aws::auth::{verify_identity, CallerIdentity, FALLBACK_REGION};
use crate::aws::regions::resolve_regions;
use crate::error::InventoryError;
use crate::inventory::{collect_inventory, RegionFailure};
use crate::report::Report;
use crate::resource::SdkDispatch;
use std::path::PathBuf;

/// Inputs of one run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Workbook path, fixed before any API call
    pub output_path: PathBuf,
    /// Region the region directory is queried in
    pub anchor_region: String,
    /// Session default region; `None` means the built-in fallback
    pub default_region: Option<String>,
}

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub identity: CallerIdentity,
    pub regions: Vec<String>,
    /// (sheet name, record count) in workbook order
    pub sheet_counts: Vec<(String, usize)>,
    pub failures: Vec<RegionFailure>,
    pub output_path: PathBuf,
}

impl RunSummary {
    pub fn total_records(&self) -> usize {
        self.sheet_counts.iter().map(|(_, count)| count).sum()
    }
}

/// Run a full inventory scan and write the report
pub async fn run(
    dispatch: &dyn SdkDispatch,
    options: &RunOptions,
) -> Result<RunSummary, InventoryError> {
    let identity_region = options.default_region.as_deref().unwrap_or(FALLBACK_REGION);
    let identity = verify_identity(dispatch, identity_region)
        .await
        .map_err(|e| InventoryError::Authentication(format!("{:#}", e)))?;
    tracing::info!("Authenticated as: {}", identity.arn);

    let regions = resolve_regions(
        dispatch,
        &options.anchor_region,
        options.default_region.as_deref(),
    )
    .await;
    tracing::info!("Scanning {} regions: {:?}", regions.len(), regions);

    let inventory = collect_inventory(dispatch, &regions).await;
    let report = Report::from_inventory(&inventory);

    tracing::info!("Writing results to {}...", options.output_path.display());
    report
        .write(&options.output_path)
        .map_err(|e| InventoryError::ReportWrite {
            path: options.output_path.clone(),
            message: format!("{:#}", e),
        })?;

    if !inventory.failures.is_empty() {
        tracing::warn!(
            "{} region scans failed; their resources are missing from the report",
            inventory.failures.len()
        );
    }
    tracing::info!("Done! Inventory generation complete.");

    Ok(RunSummary {
        identity,
        regions,
        sheet_counts: report
            .sheets()
            .iter()
            .map(|s| (s.name.clone(), s.record_count()))
            .collect(),
        failures: inventory.failures,
        output_path: options.output_path.clone(),
    })
}
