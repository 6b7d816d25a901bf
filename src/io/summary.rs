use anyhow::{Result, bail};

use crate::ctx::Ctx;

pub fn format_summary(ctx: &Ctx) -> Result<String> {
    let version = env!("CARGO_PKG_VERSION");
    let Some(sweep) = &ctx.sweep else {
        bail!("metrics missing");
    };
    let report = &ctx.report;

    let mut out = String::new();
    out.push_str(&format!("kira-recist v{}\n", version));
    out.push_str(&format!(
        "Reference: {} rows, {} locations ({})\n",
        report.input.reference_rows.unwrap_or(0),
        report.input.locations.len(),
        report.input.location_label
    ));
    out.push_str(&format!(
        "Cohort: {} patients, {} lesions, seed={} ({})\n",
        report.cohort.patients,
        report.cohort.lesions,
        ctx.seed.map(|s| s.to_string()).unwrap_or_else(|| "none".to_string()),
        ctx.config.seed_mode.as_str()
    ));

    let categories: Vec<String> = report
        .categories
        .iter()
        .map(|(c, n)| format!("{}={}", c, n))
        .collect();
    out.push_str(&format!("RECIST (all): {}\n", categories.join(" ")));

    out.push_str("targets\teligible\taccuracy\tpd_sensitivity\n");
    for p in &sweep.points {
        out.push_str(&format!(
            "{}\t{}\t{:.2}\t{:.2}\n",
            p.target_count, p.eligible, p.accuracy, p.pd_sensitivity
        ));
    }

    if ctx.write_outputs {
        out.push_str(&format!("Output: {}\n", ctx.output.run_dir.display()));
    }

    Ok(out)
}
