use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::recist::{assess_with, select_targets_with};

pub struct Stage4Targets;

impl Stage4Targets {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4Targets {
    fn name(&self) -> &'static str {
        "stage4_targets"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let fanout = ctx.fanout();
        let seed_mode = ctx.config.seed_mode;
        let max_targets = ctx.config.max_target_count;
        let rng = ctx
            .rng
            .as_mut()
            .context("random source not initialised before Stage 4")?;
        let table = ctx
            .responses
            .as_mut()
            .context("all-lesion assessment missing before Stage 4")?;

        for k in 1..=max_targets {
            let targets = select_targets_with(k, &ctx.lesions, rng, seed_mode, fanout)?;
            let subset = assess_with(&targets, fanout)
                .with_context(|| format!("assessment with {} targets failed", k))?;
            table.append_target_column(k, &subset)?;
            debug!(target_count = k, selected = targets.len(), "targets_assessed");
        }

        info!(target_counts = max_targets, "recist_targets_ready");
        Ok(())
    }
}
