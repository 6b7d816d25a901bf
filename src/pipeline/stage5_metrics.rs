use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::recist::sweep_target_counts;

pub struct Stage5Metrics;

impl Stage5Metrics {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage5Metrics {
    fn name(&self) -> &'static str {
        "stage5_metrics"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let table = ctx
            .responses
            .as_ref()
            .context("response table missing before Stage 5")?;
        // The sweep bound is exclusive; +1 scores every evaluated column.
        let sweep = sweep_target_counts(table, ctx.config.max_target_count + 1)?;
        for p in &sweep.points {
            info!(
                target_count = p.target_count,
                eligible = p.eligible,
                accuracy = p.accuracy,
                pd_sensitivity = p.pd_sensitivity,
                "recist_metrics"
            );
        }
        ctx.report.metrics = sweep.points.clone();
        ctx.sweep = Some(sweep);
        Ok(())
    }
}
