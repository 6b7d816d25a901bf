use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::recist::{ResponseTable, assess_with};

pub struct Stage3Assess;

impl Stage3Assess {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Assess {
    fn name(&self) -> &'static str {
        "stage3_assess"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        if ctx.lesions.is_empty() {
            anyhow::bail!("no synthetic lesions to assess");
        }
        let responses = assess_with(&ctx.lesions, ctx.fanout())?;
        let table = ResponseTable::from_assessment(responses);

        let max_lesions = table
            .rows
            .iter()
            .map(|r| r.response.num_lesions)
            .max()
            .unwrap_or(0);
        ctx.report.cohort.max_lesions_per_patient = max_lesions as u64;
        ctx.report.categories = table
            .category_counts()
            .into_iter()
            .map(|(c, n)| (c.as_str().to_string(), n as u64))
            .collect();

        info!(patients = table.len(), "recist_all_ready");
        ctx.responses = Some(table);
        Ok(())
    }
}
