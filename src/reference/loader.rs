use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, StringRecord};

use crate::error::SimError;
use crate::io::open_maybe_gz;
use crate::reference::{ReferenceData, ReferenceMeasurement};

pub mod columns {
    pub const DIAMETER_2D_MAX: &str = "original_shape_Maximum2DDiameterSlice";
    pub const DIAMETER_3D_MAX: &str = "original_shape_Maximum3DDiameter";
    pub const MAJOR_AXIS: &str = "original_shape_MajorAxisLength";
    pub const MINOR_AXIS: &str = "original_shape_MinorAxisLength";
    pub const VOXEL_VOLUME: &str = "original_shape_VoxelVolume";
    pub const SPACING: &str = "diagnostics_Image-interpolated_Spacing";
    pub const VOLUME_CC_CONTOURED: &str = "volume_cc_contoured";

    pub const NUMERIC: [&str; 4] = [DIAMETER_2D_MAX, DIAMETER_3D_MAX, MAJOR_AXIS, MINOR_AXIS];
}

pub fn load_reference(path: &Path, label_columns: &[String]) -> Result<ReferenceData> {
    let reader = open_maybe_gz(path)
        .with_context(|| format!("failed to open reference data {}", path.display()))?;
    parse_reference(reader, &path.display().to_string(), label_columns)
}

/// Parses a radiomics feature table.
///
/// `volume_cc_contoured` is taken from its own column when present, otherwise
/// derived as voxel volume times slice thickness (from the interpolated
/// spacing) over 1000. Requested label columns missing from the header are not
/// an error here; `ReferenceData::location_column` reports them.
pub fn parse_reference<R: Read>(
    reader: R,
    source: &str,
    label_columns: &[String],
) -> Result<ReferenceData> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr
        .headers()
        .with_context(|| format!("{}: failed to read header", source))?
        .clone();
    let header_names: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
    let find = |name: &str| header_names.iter().position(|h| h == name);

    let mut numeric_idx = [0usize; 4];
    for (slot, name) in numeric_idx.iter_mut().zip(columns::NUMERIC) {
        *slot = find(name).ok_or_else(|| {
            SimError::data_quality(format!("{}: missing required column {}", source, name))
        })?;
    }
    let voxel_idx = find(columns::VOXEL_VOLUME);
    let spacing_idx = find(columns::SPACING);
    let volume_idx = find(columns::VOLUME_CC_CONTOURED);
    if volume_idx.is_none() && (voxel_idx.is_none() || spacing_idx.is_none()) {
        return Err(SimError::data_quality(format!(
            "{}: need {} or both {} and {}",
            source,
            columns::VOLUME_CC_CONTOURED,
            columns::VOXEL_VOLUME,
            columns::SPACING
        ))
        .into());
    }

    let mut kept_labels = Vec::new();
    let mut label_idx = Vec::new();
    for name in label_columns {
        if let Some(idx) = find(name) {
            if !kept_labels.contains(name) {
                kept_labels.push(name.clone());
                label_idx.push(idx);
            }
        }
    }

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let row_no = i + 1;
        let record = record.with_context(|| format!("{}: failed to read row {}", source, row_no))?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let diameter_2d_max =
            number(&record, numeric_idx[0], columns::DIAMETER_2D_MAX, source, row_no)?;
        if diameter_2d_max <= 0.0 {
            return Err(SimError::data_quality(format!(
                "{}:{} {} must be > 0, got {}",
                source,
                row_no,
                columns::DIAMETER_2D_MAX,
                diameter_2d_max
            ))
            .into());
        }
        let diameter_3d_max =
            number(&record, numeric_idx[1], columns::DIAMETER_3D_MAX, source, row_no)?;
        let major_axis = number(&record, numeric_idx[2], columns::MAJOR_AXIS, source, row_no)?;
        let minor_axis = number(&record, numeric_idx[3], columns::MINOR_AXIS, source, row_no)?;

        let voxel_volume = match voxel_idx {
            Some(idx) => Some(number(&record, idx, columns::VOXEL_VOLUME, source, row_no)?),
            None => None,
        };
        let slice_thickness = match spacing_idx {
            Some(idx) => Some(parse_slice_thickness(field(idx)).ok_or_else(|| {
                SimError::data_quality(format!(
                    "{}:{} cannot parse slice thickness from {:?}",
                    source,
                    row_no,
                    field(idx)
                ))
            })?),
            None => None,
        };
        let volume_cc_contoured = match (volume_idx, voxel_volume, slice_thickness) {
            (Some(idx), _, _) => {
                number(&record, idx, columns::VOLUME_CC_CONTOURED, source, row_no)?
            }
            (None, Some(voxels), Some(thickness)) => voxels * thickness / 1000.0,
            _ => bail!("{}:{} contoured volume unavailable", source, row_no),
        };

        let labels = label_idx.iter().map(|&idx| field(idx).to_string()).collect();

        rows.push(ReferenceMeasurement {
            diameter_2d_max,
            diameter_3d_max,
            major_axis,
            minor_axis,
            voxel_volume,
            slice_thickness,
            volume_cc_contoured,
            labels,
        });
    }

    if rows.is_empty() {
        return Err(SimError::data_quality(format!("{}: no reference rows", source)).into());
    }

    Ok(ReferenceData {
        source: source.to_string(),
        columns: header_names,
        label_columns: kept_labels,
        rows,
    })
}

/// Last component of a spacing tuple such as `(0.78, 0.78, 5.0)`.
pub fn parse_slice_thickness(spacing: &str) -> Option<f64> {
    let last = spacing.rsplit(',').next()?;
    let value: f64 = last
        .trim()
        .trim_matches(|c| c == '(' || c == ')' || c == '[' || c == ']')
        .trim()
        .parse()
        .ok()?;
    if value.is_finite() { Some(value) } else { None }
}

fn number(
    record: &StringRecord,
    idx: usize,
    column: &str,
    source: &str,
    row_no: usize,
) -> Result<f64> {
    let raw = record.get(idx).unwrap_or("").trim();
    let value: f64 = raw.parse().map_err(|_| {
        SimError::data_quality(format!(
            "{}:{} {} is not a number: {:?}",
            source, row_no, column, raw
        ))
    })?;
    if !value.is_finite() {
        return Err(SimError::data_quality(format!(
            "{}:{} {} is not finite",
            source, row_no, column
        ))
        .into());
    }
    Ok(value)
}
