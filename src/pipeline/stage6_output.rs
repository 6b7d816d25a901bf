use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::io::{json_writer, lesion_csv, response_csv, tsv_writer};
use crate::pipeline::Stage;

pub struct Stage6Output;

impl Stage6Output {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage6Output {
    fn name(&self) -> &'static str {
        "stage6_output"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let report = json_writer::build_report(ctx)?;
        ctx.report = report;

        if !ctx.write_outputs {
            info!("stage6_output_skipped");
            return Ok(());
        }

        let table = ctx
            .responses
            .as_ref()
            .context("response table missing before Stage 6")?;
        let sweep = ctx.sweep.as_ref().context("metrics missing before Stage 6")?;

        lesion_csv::write_lesions(&ctx.output.lesions_csv, &ctx.lesions)?;
        response_csv::write_responses(&ctx.output.responses_csv, table)?;
        tsv_writer::write_metrics_tsv(&ctx.output.metrics_tsv, sweep)?;
        json_writer::write_json(&ctx.output.summary_json, &ctx.report)?;

        info!(run_dir = %ctx.output.run_dir.display(), "stage6_output_ready");
        Ok(())
    }
}
