use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::{
    ChangeDistribution, DEFAULT_EXPECTED_LESIONS, DEFAULT_LOCATION_LABEL, DEFAULT_MAX_LESIONS,
    DEFAULT_MAX_TARGETS, DEFAULT_PATIENT_COUNT, SeedMode, SimConfig,
};

#[derive(Debug, Parser)]
#[command(
    name = "kira-recist",
    version,
    about = "Synthetic lesion cohorts and RECIST target-lesion sensitivity"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Run(RunArgs),
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long, help = "Radiomics feature CSV (optionally .csv.gz)")]
    pub input: PathBuf,

    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, default_value_t = DEFAULT_PATIENT_COUNT)]
    pub patients: usize,

    #[arg(
        long,
        default_value_t = DEFAULT_EXPECTED_LESIONS,
        help = "Poisson mean lesions per patient"
    )]
    pub expected_lesions: f64,

    #[arg(long, default_value_t = DEFAULT_MAX_LESIONS)]
    pub max_lesions: usize,

    #[arg(
        long,
        default_value = DEFAULT_LOCATION_LABEL,
        help = "Reference column holding the lesion location"
    )]
    pub location_label: String,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = SeedModeArg::Shared)]
    pub seed_mode: SeedModeArg,

    #[arg(long, default_value_t = false)]
    pub parallel: bool,

    #[arg(long, default_value_t = 0, help = "Number of threads (0 = auto)")]
    pub threads: usize,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub change_mean: f64,

    #[arg(long, default_value_t = 0.3)]
    pub change_std: f64,

    #[arg(long, default_value_t = DEFAULT_MAX_TARGETS, help = "Evaluate 1..=N target lesions")]
    pub max_targets: usize,

    #[arg(long, default_value_t = false, help = "Run without writing output files")]
    pub no_write: bool,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(long, help = "Radiomics feature CSV (optionally .csv.gz)")]
    pub input: PathBuf,

    #[arg(long, default_value = DEFAULT_LOCATION_LABEL)]
    pub location_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeedModeArg {
    Shared,
    PerPatient,
}

impl From<SeedModeArg> for SeedMode {
    fn from(arg: SeedModeArg) -> Self {
        match arg {
            SeedModeArg::Shared => SeedMode::Shared,
            SeedModeArg::PerPatient => SeedMode::PerPatient,
        }
    }
}

impl RunArgs {
    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            patient_count: self.patients,
            expected_lesion_count: self.expected_lesions,
            max_lesion_count: self.max_lesions,
            location_label: self.location_label.clone(),
            random_seed: self.seed,
            seed_mode: self.seed_mode.into(),
            parallel: self.parallel,
            threads: self.threads,
            change: ChangeDistribution {
                mean: self.change_mean,
                std_dev: self.change_std,
                ..ChangeDistribution::default()
            },
            max_target_count: self.max_targets,
        }
    }
}
