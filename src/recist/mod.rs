pub mod assess;
pub mod metrics;
pub mod targets;

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::sim::SyntheticLesion;

pub use assess::{assess, assess_with, sld_change};
pub use metrics::{SweepPoint, SweepResult, sweep_target_counts};
pub use targets::{cap_per_location, cap_total, select_targets, select_targets_with};

/// SLD change strictly above this is progressive disease.
pub const PD_THRESHOLD: f64 = 20.0;
/// SLD change at or below this (and above -100) is partial response.
pub const PR_THRESHOLD: f64 = -30.0;
/// SLD change of exactly this is complete response.
pub const CR_CHANGE: f64 = -100.0;

/// Lesions tracked per location at most.
pub const MAX_TARGETS_PER_LOCATION: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResponseCategory {
    #[serde(rename = "PD")]
    ProgressiveDisease,
    #[serde(rename = "SD")]
    StableDisease,
    #[serde(rename = "PR")]
    PartialResponse,
    #[serde(rename = "CR")]
    CompleteResponse,
}

impl ResponseCategory {
    pub const ALL: [Self; 4] = [
        Self::ProgressiveDisease,
        Self::StableDisease,
        Self::PartialResponse,
        Self::CompleteResponse,
    ];

    /// Maps a percent SLD change to its category.
    ///
    /// | change | category |
    /// |---|---|
    /// | > 20 | PD |
    /// | (-30, 20] | SD |
    /// | (-100, -30] | PR |
    /// | == -100 | CR |
    ///
    /// Anything else (below -100, NaN) has no category.
    pub fn from_sld_change(sld_chg: f64) -> Option<Self> {
        if sld_chg > PD_THRESHOLD {
            Some(Self::ProgressiveDisease)
        } else if sld_chg > PR_THRESHOLD && sld_chg <= PD_THRESHOLD {
            Some(Self::StableDisease)
        } else if sld_chg > CR_CHANGE && sld_chg <= PR_THRESHOLD {
            Some(Self::PartialResponse)
        } else if sld_chg == CR_CHANGE {
            Some(Self::CompleteResponse)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProgressiveDisease => "PD",
            Self::StableDisease => "SD",
            Self::PartialResponse => "PR",
            Self::CompleteResponse => "CR",
        }
    }
}

impl fmt::Display for ResponseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-patient RECIST assessment over one lesion set.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientResponse {
    pub patient_id: usize,
    pub num_lesions: usize,
    pub sld_pre: f64,
    pub sld_post: f64,
    pub sld_chg: f64,
    pub category: ResponseCategory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRow {
    pub response: PatientResponse,
    /// Categories aligned with `ResponseTable::target_counts`.
    pub by_target: Vec<ResponseCategory>,
}

/// All-lesion ground truth plus one category column per evaluated target count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseTable {
    pub target_counts: Vec<usize>,
    pub rows: Vec<ResponseRow>,
}

impl ResponseTable {
    pub fn from_assessment(responses: Vec<PatientResponse>) -> Self {
        Self {
            target_counts: Vec::new(),
            rows: responses
                .into_iter()
                .map(|response| ResponseRow {
                    response,
                    by_target: Vec::new(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn target_column(&self, target_count: usize) -> Option<usize> {
        self.target_counts.iter().position(|&k| k == target_count)
    }

    /// Adds the `RECIST (k targets)` column from a subset assessment.
    ///
    /// `subset` must hold exactly one response per patient of the table, in
    /// patient order (as `assess` returns it).
    pub fn append_target_column(
        &mut self,
        target_count: usize,
        subset: &[PatientResponse],
    ) -> Result<()> {
        if self.target_column(target_count).is_some() {
            bail!("target count {} already evaluated", target_count);
        }
        if subset.len() != self.rows.len() {
            bail!(
                "subset assessment for {} targets covers {} patients, table has {}",
                target_count,
                subset.len(),
                self.rows.len()
            );
        }
        for (row, sub) in self.rows.iter().zip(subset) {
            if row.response.patient_id != sub.patient_id {
                bail!(
                    "subset assessment for {} targets out of step: patient {} vs {}",
                    target_count,
                    row.response.patient_id,
                    sub.patient_id
                );
            }
        }
        for (row, sub) in self.rows.iter_mut().zip(subset) {
            row.by_target.push(sub.category);
        }
        self.target_counts.push(target_count);
        Ok(())
    }

    pub fn category_counts(&self) -> BTreeMap<ResponseCategory, usize> {
        let mut counts = BTreeMap::new();
        for c in ResponseCategory::ALL {
            counts.insert(c, 0);
        }
        for row in &self.rows {
            *counts.entry(row.response.category).or_insert(0) += 1;
        }
        counts
    }
}

/// Row indices of each patient, patients ascending, rows in table order.
pub(crate) fn patient_groups(lesions: &[SyntheticLesion]) -> Vec<(usize, Vec<usize>)> {
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, lesion) in lesions.iter().enumerate() {
        groups.entry(lesion.patient_id).or_default().push(idx);
    }
    groups.into_iter().collect()
}
