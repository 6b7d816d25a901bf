use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::reference::load_reference;

pub struct Stage1Reference;

impl Stage1Reference {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Reference {
    fn name(&self) -> &'static str {
        "stage1_reference"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let label = ctx.config.location_label.clone();
        let reference = load_reference(&ctx.input, std::slice::from_ref(&label))?;
        // Missing location column is fatal before any sampling happens.
        let column = reference.location_column(&label)?;
        let locations = reference.location_counts(column);

        info!(
            reference = %reference.source,
            rows = reference.len(),
            locations = locations.len(),
            "reference_loaded"
        );

        ctx.report.input.reference = reference.source.clone();
        ctx.report.input.reference_rows = Some(reference.len() as u64);
        ctx.report.input.locations = locations
            .into_iter()
            .map(|(k, v)| (k, v as u64))
            .collect();
        ctx.reference = Some(reference);
        Ok(())
    }
}
