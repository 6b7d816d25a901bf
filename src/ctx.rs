use std::path::{Path, PathBuf};

use crate::config::SimConfig;
use crate::par::Fanout;
use crate::recist::{ResponseTable, SweepResult};
use crate::reference::ReferenceData;
use crate::schema::v1::RecistSimV1;
use crate::sim::{RandomSource, SyntheticLesion};

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
    pub run_dir: PathBuf,
    pub lesions_csv: PathBuf,
    pub responses_csv: PathBuf,
    pub metrics_tsv: PathBuf,
    pub summary_json: PathBuf,
}

impl OutputPaths {
    /// `<out>/<dataset>/sim_<patients>_pats/`.
    pub fn new(out_dir: PathBuf, dataset: &str, patient_count: usize) -> Self {
        let run_dir = out_dir
            .join(dataset)
            .join(format!("sim_{}_pats", patient_count));
        Self {
            lesions_csv: run_dir.join(format!("{}_synthetic_lesions.csv", dataset)),
            responses_csv: run_dir.join(format!("{}_synthetic_patient_response.csv", dataset)),
            metrics_tsv: run_dir.join("recist_metrics.tsv"),
            summary_json: run_dir.join("summary.json"),
            run_dir,
            out_dir,
        }
    }
}

#[derive(Debug)]
pub struct Ctx {
    pub input: PathBuf,
    pub dataset: String,
    pub config: SimConfig,
    pub write_outputs: bool,
    pub seed: Option<u64>,
    pub rng: Option<RandomSource>,
    pub warnings: Vec<String>,
    pub reference: Option<ReferenceData>,
    pub lesions: Vec<SyntheticLesion>,
    pub responses: Option<ResponseTable>,
    pub sweep: Option<SweepResult>,
    pub output: OutputPaths,
    pub report: RecistSimV1,
}

impl Ctx {
    pub fn new(
        input: PathBuf,
        out_dir: PathBuf,
        config: SimConfig,
        write_outputs: bool,
        tool_version: &str,
    ) -> Self {
        let dataset = dataset_name(&input);
        let output = OutputPaths::new(out_dir, &dataset, config.patient_count);
        let report = RecistSimV1::empty(tool_version, &dataset, config.clone());
        Self {
            input,
            dataset,
            config,
            write_outputs,
            seed: None,
            rng: None,
            warnings: Vec::new(),
            reference: None,
            lesions: Vec::new(),
            responses: None,
            sweep: None,
            output,
            report,
        }
    }

    pub fn fanout(&self) -> Fanout {
        Fanout::new(self.config.parallel, self.config.threads)
    }

    pub fn rng_mut(&mut self) -> anyhow::Result<&mut RandomSource> {
        self.rng
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("random source not initialised"))
    }
}

/// Name of the directory holding the reference file, falling back to the
/// file stem (`data/SARC021/radiomics.csv` gives `SARC021`).
pub fn dataset_name(input: &Path) -> String {
    input
        .parent()
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .or_else(|| input.file_stem().and_then(|s| s.to_str()))
        .unwrap_or("dataset")
        .to_string()
}
