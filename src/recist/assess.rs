use anyhow::Result;

use crate::error::SimError;
use crate::par::Fanout;
use crate::recist::{PatientResponse, ResponseCategory, patient_groups};
use crate::sim::SyntheticLesion;

/// Percent change of the sum of longest diameters.
pub fn sld_change(sld_pre: f64, sld_post: f64) -> f64 {
    (sld_post - sld_pre) / sld_pre * 100.0
}

pub fn assess(lesions: &[SyntheticLesion]) -> Result<Vec<PatientResponse>> {
    assess_with(lesions, Fanout::sequential())
}

/// RECIST assessment per patient, sorted by patient id.
///
/// A patient whose SLD_pre is not a positive finite number fails the whole
/// assessment with a data-quality error. The output does not depend on
/// `fanout`.
pub fn assess_with(lesions: &[SyntheticLesion], fanout: Fanout) -> Result<Vec<PatientResponse>> {
    let groups = patient_groups(lesions);
    fanout.map_indexed(groups.len(), |g| {
        let (patient_id, rows) = &groups[g];
        assess_patient(*patient_id, rows.iter().map(|&i| &lesions[i]))
    })
}

fn assess_patient<'a>(
    patient_id: usize,
    lesions: impl Iterator<Item = &'a SyntheticLesion>,
) -> Result<PatientResponse> {
    let mut num_lesions = 0usize;
    let mut sld_pre = 0.0f64;
    let mut sld_post = 0.0f64;
    for l in lesions {
        num_lesions += 1;
        sld_pre += l.diameter_pre;
        sld_post += l.diameter_post;
    }

    if !sld_pre.is_finite() || sld_pre <= 0.0 {
        return Err(SimError::data_quality(format!(
            "patient {} has SLD_pre = {}; percent change undefined",
            patient_id, sld_pre
        ))
        .into());
    }
    let sld_chg = sld_change(sld_pre, sld_post);
    let category = ResponseCategory::from_sld_change(sld_chg).ok_or_else(|| {
        SimError::data_quality(format!(
            "patient {} SLD change {} outside the RECIST domain",
            patient_id, sld_chg
        ))
    })?;

    Ok(PatientResponse {
        patient_id,
        num_lesions,
        sld_pre,
        sld_post,
        sld_chg,
        category,
    })
}
