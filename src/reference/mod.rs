mod loader;

use std::collections::BTreeMap;

use anyhow::Result;

use crate::error::SimError;

pub use loader::{columns, load_reference, parse_reference, parse_slice_thickness};

/// One historical lesion measured on real imaging.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceMeasurement {
    pub diameter_2d_max: f64,
    pub diameter_3d_max: f64,
    pub major_axis: f64,
    pub minor_axis: f64,
    pub voxel_volume: Option<f64>,
    pub slice_thickness: Option<f64>,
    pub volume_cc_contoured: f64,
    /// Label values, aligned with `ReferenceData::label_columns`.
    pub labels: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub source: String,
    /// Every header of the input, in file order.
    pub columns: Vec<String>,
    pub label_columns: Vec<String>,
    pub rows: Vec<ReferenceMeasurement>,
}

impl ReferenceData {
    /// Builds an in-memory dataset. Label columns are also reported as columns.
    pub fn from_rows(label_columns: Vec<String>, rows: Vec<ReferenceMeasurement>) -> Result<Self> {
        for (idx, row) in rows.iter().enumerate() {
            if row.labels.len() != label_columns.len() {
                anyhow::bail!(
                    "reference row {} has {} labels, expected {}",
                    idx,
                    row.labels.len(),
                    label_columns.len()
                );
            }
        }
        let mut columns: Vec<String> = columns::NUMERIC.iter().map(|c| c.to_string()).collect();
        columns.extend(label_columns.iter().cloned());
        Ok(Self {
            source: "in-memory".to_string(),
            columns,
            label_columns,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolves the label slot holding `name`.
    ///
    /// Fails with a configuration error when the column does not exist in the
    /// input, or exists but was not loaded as a label.
    pub fn location_column(&self, name: &str) -> Result<usize> {
        if let Some(pos) = self.label_columns.iter().position(|c| c == name) {
            return Ok(pos);
        }
        if self.columns.iter().any(|c| c == name) {
            return Err(SimError::config(format!(
                "{} exists in {} but was not loaded as a label column",
                name, self.source
            ))
            .into());
        }
        Err(SimError::config(format!(
            "{} is not a column name in the provided radiomic data ({})",
            name, self.source
        ))
        .into())
    }

    pub fn location(&self, row: usize, column: usize) -> &str {
        &self.rows[row].labels[column]
    }

    /// Row count per distinct location value.
    pub fn location_counts(&self, column: usize) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.labels[column].clone()).or_insert(0) += 1;
        }
        counts
    }
}
