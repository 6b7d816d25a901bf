use anyhow::Result;
use std::time::Instant;
use tracing::{info, warn};

use crate::ctx::Ctx;

pub mod stage0_scaffold;
pub mod stage1_reference;
pub mod stage2_generate;
pub mod stage3_assess;
pub mod stage4_targets;
pub mod stage5_metrics;
pub mod stage6_output;

pub trait Stage {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut Ctx) -> Result<()>;
}

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Every stage of a full simulation run, in order.
    pub fn simulation() -> Self {
        Self::new(vec![
            Box::new(stage0_scaffold::Stage0Scaffold::new()),
            Box::new(stage1_reference::Stage1Reference::new()),
            Box::new(stage2_generate::Stage2Generate::new()),
            Box::new(stage3_assess::Stage3Assess::new()),
            Box::new(stage4_targets::Stage4Targets::new()),
            Box::new(stage5_metrics::Stage5Metrics::new()),
            Box::new(stage6_output::Stage6Output::new()),
        ])
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn run(&self, ctx: &mut Ctx) -> Result<()> {
        info!(
            dataset = %ctx.dataset,
            patients = ctx.config.patient_count,
            parallel = ctx.fanout().is_parallel(),
            "pipeline started"
        );
        for stage in &self.stages {
            let start = Instant::now();
            info!(stage = stage.name(), "stage started");
            if let Err(err) = stage.run(ctx) {
                let elapsed_ms = start.elapsed().as_millis();
                warn!(
                    stage = stage.name(),
                    elapsed_ms = elapsed_ms as u64,
                    "stage failed"
                );
                return Err(err);
            }
            let elapsed_ms = start.elapsed().as_millis();
            info!(
                stage = stage.name(),
                elapsed_ms = elapsed_ms as u64,
                "stage finished"
            );
        }
        Ok(())
    }
}
