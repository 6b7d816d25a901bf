use anyhow::{Context, Result};
use std::fs;
use tracing::{info, warn};

use crate::config::SeedMode;
use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::sim::RandomSource;
use crate::sim::rng::entropy_seed;

pub struct Stage0Scaffold;

impl Stage0Scaffold {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage0Scaffold {
    fn name(&self) -> &'static str {
        "stage0_scaffold"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        ctx.config.validate()?;

        let seed = match ctx.config.random_seed {
            Some(seed) => seed,
            None => {
                let seed = entropy_seed();
                warn!(seed, "no random seed supplied; drew one from entropy");
                ctx.warnings
                    .push(format!("no random seed supplied; run used seed {}", seed));
                seed
            }
        };
        ctx.seed = Some(seed);
        ctx.rng = Some(RandomSource::from_seed(seed));
        ctx.report.seed = Some(seed);

        if ctx.config.parallel && ctx.config.seed_mode == SeedMode::Shared {
            info!("shared seed mode: random draws stay sequential, assessment runs in parallel");
        }

        if ctx.write_outputs {
            fs::create_dir_all(&ctx.output.run_dir).with_context(|| {
                format!("failed to create {}", ctx.output.run_dir.display())
            })?;
            info!(
                run_dir = %ctx.output.run_dir.display(),
                "output_dir_ready"
            );
        }

        info!(
            seed,
            seed_mode = ctx.config.seed_mode.as_str(),
            "random_source_ready"
        );
        Ok(())
    }
}
