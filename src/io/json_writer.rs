use std::path::Path;

use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::schema::v1::{Artifacts, RecistSimV1};

pub fn build_report(ctx: &Ctx) -> Result<RecistSimV1> {
    let mut report = ctx.report.clone();
    report.version = env!("CARGO_PKG_VERSION").to_string();
    report.config = ctx.config.clone();
    report.seed = ctx.seed;
    report.warnings = ctx.warnings.clone();

    if let Some(sweep) = &ctx.sweep {
        report.metrics = sweep.points.clone();
    }

    report.artifacts = if ctx.write_outputs {
        Artifacts {
            lesions: Some(file_name(&ctx.output.lesions_csv)?),
            responses: Some(file_name(&ctx.output.responses_csv)?),
            metrics: Some(file_name(&ctx.output.metrics_tsv)?),
        }
    } else {
        Artifacts {
            lesions: None,
            responses: None,
            metrics: None,
        }
    };

    Ok(report)
}

pub fn write_json(path: &Path, report: &RecistSimV1) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .with_context(|| format!("output path {} has no file name", path.display()))
}
