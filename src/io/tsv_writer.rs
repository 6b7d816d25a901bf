use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::recist::SweepResult;

pub fn write_metrics_tsv(path: &Path, sweep: &SweepResult) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);

    writeln!(
        w,
        "target_count\teligible\taccuracy\tpd_eligible\tpd_sensitivity"
    )?;
    for p in &sweep.points {
        writeln!(
            w,
            "{}\t{}\t{:.6}\t{}\t{:.6}",
            p.target_count, p.eligible, p.accuracy, p.pd_eligible, p.pd_sensitivity
        )?;
    }
    w.flush()?;
    Ok(())
}
