use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;

use crate::io::fmt_f64;
use crate::sim::SyntheticLesion;

pub const LESION_COLUMNS: [&str; 16] = [
    "index",
    "patient_id",
    "lesion_idx",
    "diameter_pre",
    "diameter_change",
    "diameter_post",
    "location",
    "volume_cc_contoured",
    "diameter_3D_max",
    "diameter_major_ax",
    "diameter_minor_ax",
    "volume_cc_pre",
    "volume_cc_post",
    "volume_cc_3Dmax",
    "volume_cc_majorAx",
    "volume_cc_minorAx",
];

pub fn write_lesions(path: &Path, lesions: &[SyntheticLesion]) -> Result<()> {
    let mut w = Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    w.write_record(LESION_COLUMNS)?;
    for (index, l) in lesions.iter().enumerate() {
        w.write_record([
            index.to_string(),
            l.patient_id.to_string(),
            l.lesion_idx.to_string(),
            fmt_f64(l.diameter_pre),
            fmt_f64(l.diameter_change),
            fmt_f64(l.diameter_post),
            l.location.clone(),
            fmt_f64(l.volume_cc_contoured),
            fmt_f64(l.diameter_3d_max),
            fmt_f64(l.diameter_major_ax),
            fmt_f64(l.diameter_minor_ax),
            fmt_f64(l.volume_cc_pre),
            fmt_f64(l.volume_cc_post),
            fmt_f64(l.volume_cc_3d_max),
            fmt_f64(l.volume_cc_major_ax),
            fmt_f64(l.volume_cc_minor_ax),
        ])?;
    }
    w.flush()?;
    Ok(())
}
