use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::sim::generate_population;

pub struct Stage2Generate;

impl Stage2Generate {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Generate {
    fn name(&self) -> &'static str {
        "stage2_generate"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let reference = ctx
            .reference
            .as_ref()
            .context("reference data not loaded before Stage 2")?;
        let rng = ctx
            .rng
            .as_mut()
            .context("random source not initialised before Stage 2")?;
        let lesions = generate_population(ctx.config.patient_count, reference, &ctx.config, rng)?;

        let patients = ctx.config.patient_count;
        let mean = if patients == 0 {
            0.0
        } else {
            lesions.len() as f64 / patients as f64
        };
        ctx.report.cohort.patients = patients as u64;
        ctx.report.cohort.lesions = lesions.len() as u64;
        ctx.report.cohort.mean_lesions_per_patient = mean;
        info!(lesions = lesions.len(), mean_per_patient = mean, "lesions_ready");
        ctx.lesions = lesions;
        Ok(())
    }
}
