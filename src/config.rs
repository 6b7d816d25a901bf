use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

pub const DEFAULT_PATIENT_COUNT: usize = 10_000;
pub const DEFAULT_EXPECTED_LESIONS: f64 = 10.0;
pub const DEFAULT_MAX_LESIONS: usize = 30;
pub const DEFAULT_LOCATION_LABEL: &str = "LABEL";
pub const DEFAULT_MAX_TARGETS: usize = 10;

/// How patients draw from the random source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeedMode {
    /// One continuous stream for the whole cohort. Patient N's lesions depend
    /// on every draw made for patients 0..N.
    Shared,
    /// Each patient gets a sub-stream derived from the master seed and its
    /// index, independent of patient count and of other patients.
    PerPatient,
}

impl SeedMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::PerPatient => "per-patient",
        }
    }
}

/// Truncated normal used for the per-lesion diameter change fraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChangeDistribution {
    pub mean: f64,
    pub std_dev: f64,
    pub low: f64,
    pub high: f64,
}

impl Default for ChangeDistribution {
    fn default() -> Self {
        Self {
            mean: 0.0,
            std_dev: 0.3,
            low: -1.0,
            high: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub patient_count: usize,
    pub expected_lesion_count: f64,
    pub max_lesion_count: usize,
    pub location_label: String,
    pub random_seed: Option<u64>,
    pub seed_mode: SeedMode,
    pub parallel: bool,
    pub threads: usize,
    pub change: ChangeDistribution,
    pub max_target_count: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            patient_count: DEFAULT_PATIENT_COUNT,
            expected_lesion_count: DEFAULT_EXPECTED_LESIONS,
            max_lesion_count: DEFAULT_MAX_LESIONS,
            location_label: DEFAULT_LOCATION_LABEL.to_string(),
            random_seed: None,
            seed_mode: SeedMode::Shared,
            parallel: false,
            threads: 0,
            change: ChangeDistribution::default(),
            max_target_count: DEFAULT_MAX_TARGETS,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        if self.patient_count == 0 {
            return Err(SimError::config("patient_count must be at least 1").into());
        }
        if !self.expected_lesion_count.is_finite() || self.expected_lesion_count <= 0.0 {
            return Err(SimError::config(format!(
                "expected_lesion_count must be a positive number, got {}",
                self.expected_lesion_count
            ))
            .into());
        }
        if self.max_lesion_count == 0 {
            return Err(SimError::config("max_lesion_count must be at least 1").into());
        }
        if self.location_label.trim().is_empty() {
            return Err(SimError::config("location_label must not be empty").into());
        }
        if self.max_target_count == 0 {
            return Err(SimError::config("max_target_count must be at least 1").into());
        }
        self.change.validate()
    }
}

impl ChangeDistribution {
    pub fn validate(&self) -> Result<()> {
        let finite = [self.mean, self.std_dev, self.low, self.high]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(SimError::config("diameter change parameters must be finite").into());
        }
        if self.std_dev <= 0.0 {
            return Err(SimError::config(format!(
                "diameter change std_dev must be > 0, got {}",
                self.std_dev
            ))
            .into());
        }
        // A change below -1 would make the post-treatment diameter negative.
        if self.low < -1.0 {
            return Err(SimError::config(format!(
                "diameter change lower bound must be >= -1, got {}",
                self.low
            ))
            .into());
        }
        if self.low >= self.high {
            return Err(SimError::config(format!(
                "diameter change bounds are empty: [{}, {}]",
                self.low, self.high
            ))
            .into());
        }
        Ok(())
    }
}
