use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::SimConfig;
use crate::recist::SweepPoint;

#[derive(Debug, Clone, Serialize)]
pub struct InputMeta {
    pub reference: String,
    pub dataset: String,
    pub reference_rows: Option<u64>,
    pub location_label: String,
    pub locations: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Cohort {
    pub patients: u64,
    pub lesions: u64,
    pub mean_lesions_per_patient: f64,
    pub max_lesions_per_patient: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Artifacts {
    pub lesions: Option<String>,
    pub responses: Option<String>,
    pub metrics: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecistSimV1 {
    pub tool: String,
    pub version: String,
    pub schema_version: String,
    pub input: InputMeta,
    pub config: SimConfig,
    pub seed: Option<u64>,
    pub cohort: Cohort,
    /// All-lesion categories keyed `PD`/`SD`/`PR`/`CR`.
    pub categories: BTreeMap<String, u64>,
    pub metrics: Vec<SweepPoint>,
    pub artifacts: Artifacts,
    pub warnings: Vec<String>,
}

impl RecistSimV1 {
    pub fn empty(tool_version: &str, dataset: &str, config: SimConfig) -> Self {
        Self {
            tool: "kira-recist".to_string(),
            version: tool_version.to_string(),
            schema_version: "v1".to_string(),
            input: InputMeta {
                reference: String::new(),
                dataset: dataset.to_string(),
                reference_rows: None,
                location_label: config.location_label.clone(),
                locations: BTreeMap::new(),
            },
            config,
            seed: None,
            cohort: Cohort {
                patients: 0,
                lesions: 0,
                mean_lesions_per_patient: 0.0,
                max_lesions_per_patient: 0,
            },
            categories: BTreeMap::new(),
            metrics: Vec::new(),
            artifacts: Artifacts {
                lesions: None,
                responses: None,
                metrics: None,
            },
            warnings: Vec::new(),
        }
    }
}
