//! Report Writer
//!
//! Turns an [`Inventory`] into a five-sheet workbook. The report is built in
//! memory first ([`Report::from_inventory`]) and serialized separately
//! ([`Report::write`]), so sheet order and the placeholder rule do not depend
//! on the file format.

use crate::inventory::records::{
    Cell, ClusterRecord, DatabaseRecord, FunctionRecord, InstanceRecord, InventoryRecord,
    NamespaceRecord,
};
use crate::inventory::Inventory;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rust_xlsxwriter::Workbook;
use std::path::Path;

/// Single cell written to a sheet whose collector found nothing
pub const PLACEHOLDER_MESSAGE: &str = "No data found";

/// Sheet names, in workbook order
pub const SHEET_ORDER: [&str; 5] = [
    NamespaceRecord::SHEET_NAME,
    InstanceRecord::SHEET_NAME,
    DatabaseRecord::SHEET_NAME,
    ClusterRecord::SHEET_NAME,
    FunctionRecord::SHEET_NAME,
];

/// Workbook file name for a run started at `started_at`
pub fn output_filename(started_at: NaiveDateTime) -> String {
    format!("aws_inventory_{}.xlsx", started_at.format("%Y%m%d_%H%M%S"))
}

/// One named table; the first row is the header unless it is a placeholder
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Header plus one row per record, or the placeholder row when empty
    pub fn from_records<R: InventoryRecord>(records: &[R]) -> Self {
        if records.is_empty() {
            return Self::placeholder(R::SHEET_NAME);
        }

        let header = R::COLUMNS.iter().map(|c| Cell::text(*c)).collect();
        let mut rows = Vec::with_capacity(records.len() + 1);
        rows.push(header);
        rows.extend(records.iter().map(|r| r.cells()));

        Self {
            name: R::SHEET_NAME.to_string(),
            rows,
        }
    }

    pub fn placeholder(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rows: vec![vec![Cell::text(PLACEHOLDER_MESSAGE)]],
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.rows == vec![vec![Cell::text(PLACEHOLDER_MESSAGE)]]
    }

    /// Number of record rows (header and placeholder excluded)
    pub fn record_count(&self) -> usize {
        if self.is_placeholder() {
            0
        } else {
            self.rows.len().saturating_sub(1)
        }
    }
}

/// The five sheets of one run
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    sheets: Vec<Sheet>,
}

impl Report {
    pub fn from_inventory(inventory: &Inventory) -> Self {
        Self {
            sheets: vec![
                Sheet::from_records(&inventory.namespaces),
                Sheet::from_records(&inventory.instances),
                Sheet::from_records(&inventory.databases),
                Sheet::from_records(&inventory.clusters),
                Sheet::from_records(&inventory.functions),
            ],
        }
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Serialize the report as an xlsx workbook at `path`
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut workbook = Workbook::new();

        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(&sheet.name)
                .with_context(|| format!("Invalid sheet name: {}", sheet.name))?;

            for (row_idx, row) in sheet.rows.iter().enumerate() {
                let row_num = u32::try_from(row_idx)
                    .with_context(|| format!("Too many rows in sheet {}", sheet.name))?;

                for (col_idx, cell) in row.iter().enumerate() {
                    let col_num = u16::try_from(col_idx)
                        .with_context(|| format!("Too many columns in sheet {}", sheet.name))?;

                    match cell {
                        Cell::Text(text) if !text.is_empty() => {
                            worksheet.write_string(row_num, col_num, text)?;
                        },
                        Cell::Number(n) => {
                            worksheet.write_number(row_num, col_num, *n as f64)?;
                        },
                        _ => {},
                    }
                }
            }
        }

        workbook
            .save(path)
            .with_context(|| format!("Failed to save workbook to {}", path.display()))?;

        tracing::debug!("Wrote {} sheets to {}", self.sheets.len(), path.display());
        Ok(())
    }
}
