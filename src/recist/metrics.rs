use anyhow::{Result, bail};
use serde::Serialize;

use crate::recist::{ResponseCategory, ResponseTable};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    pub target_count: usize,
    /// Patients with more lesions than `target_count`.
    pub eligible: usize,
    pub agree: usize,
    pub accuracy: f64,
    pub pd_eligible: usize,
    pub pd_detected: usize,
    pub pd_sensitivity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepResult {
    pub points: Vec<SweepPoint>,
}

impl SweepResult {
    pub fn accuracy(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.accuracy).collect()
    }

    pub fn pd_sensitivity(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.pd_sensitivity).collect()
    }

    pub fn point(&self, target_count: usize) -> Option<&SweepPoint> {
        self.points.iter().find(|p| p.target_count == target_count)
    }
}

/// Accuracy and PD sensitivity for every target count in `1..max_target_count`.
pub fn sweep_target_counts(table: &ResponseTable, max_target_count: usize) -> Result<SweepResult> {
    let mut points = Vec::new();
    for k in 1..max_target_count {
        let Some(col) = table.target_column(k) else {
            bail!("response table has no column for {} targets", k);
        };

        let mut eligible = 0usize;
        let mut agree = 0usize;
        let mut pd_eligible = 0usize;
        let mut pd_detected = 0usize;
        for row in &table.rows {
            if row.response.num_lesions <= k {
                continue;
            }
            eligible += 1;
            let full = row.response.category;
            let subset = row.by_target[col];
            if full == subset {
                agree += 1;
            }
            if full == ResponseCategory::ProgressiveDisease {
                pd_eligible += 1;
                if subset == ResponseCategory::ProgressiveDisease {
                    pd_detected += 1;
                }
            }
        }

        points.push(SweepPoint {
            target_count: k,
            eligible,
            agree,
            accuracy: percentage(agree, eligible),
            pd_eligible,
            pd_detected,
            pd_sensitivity: percentage(pd_detected, pd_eligible),
        });
    }
    Ok(SweepResult { points })
}

/// `num / den` as a percentage, 0 when `den` is 0.
pub fn percentage(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64 * 100.0
    }
}
