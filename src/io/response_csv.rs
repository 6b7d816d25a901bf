use std::path::Path;

use anyhow::{Context, Result, bail};
use csv::Writer;

use crate::io::fmt_f64;
use crate::recist::ResponseTable;

pub const ALL_LESIONS_COLUMN: &str = "RECIST (all)";

pub fn target_column_name(target_count: usize) -> String {
    format!("RECIST ({} targets)", target_count)
}

pub fn response_header(table: &ResponseTable) -> Vec<String> {
    let mut header: Vec<String> = [
        "index",
        "patient_id",
        "num_lesions",
        "SLD_pre",
        "SLD_post",
        "SLD_chg",
        ALL_LESIONS_COLUMN,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    header.extend(table.target_counts.iter().map(|&k| target_column_name(k)));
    header
}

pub fn write_responses(path: &Path, table: &ResponseTable) -> Result<()> {
    let mut w = Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    w.write_record(response_header(table))?;
    for (index, row) in table.rows.iter().enumerate() {
        if row.by_target.len() != table.target_counts.len() {
            bail!(
                "patient {} has {} target columns, table has {}",
                row.response.patient_id,
                row.by_target.len(),
                table.target_counts.len()
            );
        }
        let r = &row.response;
        let mut record = vec![
            index.to_string(),
            r.patient_id.to_string(),
            r.num_lesions.to_string(),
            fmt_f64(r.sld_pre),
            fmt_f64(r.sld_post),
            fmt_f64(r.sld_chg),
            r.category.as_str().to_string(),
        ];
        record.extend(row.by_target.iter().map(|c| c.as_str().to_string()));
        w.write_record(&record)?;
    }
    w.flush()?;
    Ok(())
}
