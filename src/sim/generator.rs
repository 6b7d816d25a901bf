use anyhow::Result;
use rand::Rng;
use rand_distr::{Distribution, Poisson};
use tracing::info;

use crate::config::{ChangeDistribution, SeedMode, SimConfig};
use crate::error::SimError;
use crate::par::Fanout;
use crate::reference::ReferenceData;
use crate::sim::rng::RandomSource;
use crate::sim::truncnorm::TruncatedNormal;
use crate::sim::{SyntheticLesion, fill_derived_volumes};

/// Upper bound on Poisson redraws for one patient's lesion count.
pub const MAX_COUNT_DRAWS: usize = 10_000;

/// Validated per-patient lesion sampler over a reference dataset.
#[derive(Debug, Clone)]
pub struct LesionSampler<'a> {
    reference: &'a ReferenceData,
    location_column: usize,
    expected_lesion_count: f64,
    count_dist: Poisson<f64>,
    max_lesion_count: usize,
    change: TruncatedNormal,
}

impl<'a> LesionSampler<'a> {
    pub fn new(
        reference: &'a ReferenceData,
        expected_lesion_count: f64,
        location_label: &str,
        max_lesion_count: usize,
        change: &ChangeDistribution,
    ) -> Result<Self> {
        let location_column = reference.location_column(location_label)?;
        if reference.is_empty() {
            return Err(SimError::data_quality(format!(
                "reference data {} has no rows",
                reference.source
            ))
            .into());
        }
        if max_lesion_count == 0 {
            return Err(SimError::config("max_lesion_count must be at least 1").into());
        }
        if !expected_lesion_count.is_finite() || expected_lesion_count <= 0.0 {
            return Err(SimError::config(format!(
                "expected_lesion_count must be a positive number, got {}",
                expected_lesion_count
            ))
            .into());
        }
        let count_dist = Poisson::new(expected_lesion_count)
            .map_err(|e| SimError::config(format!("invalid Poisson mean: {:?}", e)))?;
        let change = TruncatedNormal::new(change)?;
        Ok(Self {
            reference,
            location_column,
            expected_lesion_count,
            count_dist,
            max_lesion_count,
            change,
        })
    }

    /// Poisson draw redrawn until it lands in `[1, max_lesion_count]`.
    pub fn draw_lesion_count(&self, rng: &mut RandomSource) -> Result<usize> {
        for _ in 0..MAX_COUNT_DRAWS {
            let n = self.count_dist.sample(rng.selection()) as usize;
            if n >= 1 && n <= self.max_lesion_count {
                return Ok(n);
            }
        }
        Err(SimError::config(format!(
            "lesion count never fell within [1, {}] after {} Poisson draws (mean {})",
            self.max_lesion_count, MAX_COUNT_DRAWS, self.expected_lesion_count
        ))
        .into())
    }

    /// One patient's lesions. Derived volume columns are left at zero; the
    /// population pass fills them.
    pub fn sample_patient(
        &self,
        patient_id: usize,
        rng: &mut RandomSource,
    ) -> Result<Vec<SyntheticLesion>> {
        let n_lesions = self.draw_lesion_count(rng)?;
        let mut lesions = Vec::with_capacity(n_lesions);
        for lesion_idx in 0..n_lesions {
            let row_idx = rng.selection().gen_range(0..self.reference.len());
            let row = &self.reference.rows[row_idx];
            let diameter_change = self.change.sample(rng.change())?;
            let diameter_pre = row.diameter_2d_max;
            let diameter_post = diameter_pre + diameter_pre * diameter_change;
            lesions.push(SyntheticLesion {
                patient_id,
                lesion_idx,
                diameter_pre,
                diameter_change,
                diameter_post,
                location: self.reference.location(row_idx, self.location_column).to_string(),
                volume_cc_contoured: row.volume_cc_contoured,
                diameter_3d_max: row.diameter_3d_max,
                diameter_major_ax: row.major_axis,
                diameter_minor_ax: row.minor_axis,
                volume_cc_pre: 0.0,
                volume_cc_post: 0.0,
                volume_cc_3d_max: 0.0,
                volume_cc_major_ax: 0.0,
                volume_cc_minor_ax: 0.0,
            });
        }
        Ok(lesions)
    }
}

pub fn generate_patient_lesions(
    reference: &ReferenceData,
    expected_lesion_count: f64,
    location_column: &str,
    rng: &mut RandomSource,
    max_lesion_count: usize,
    patient_id: usize,
    change: &ChangeDistribution,
) -> Result<Vec<SyntheticLesion>> {
    let sampler = LesionSampler::new(
        reference,
        expected_lesion_count,
        location_column,
        max_lesion_count,
        change,
    )?;
    sampler.sample_patient(patient_id, rng)
}

/// Lesions for patients `0..patient_count`, in patient order, with derived
/// volumes filled.
///
/// `SeedMode::Shared` consumes `rng` sequentially for every patient.
/// `SeedMode::PerPatient` derives a sub-source per patient from `rng.seed()`
/// and leaves `rng` untouched; only this mode honours `config.parallel`.
pub fn generate_population(
    patient_count: usize,
    reference: &ReferenceData,
    config: &SimConfig,
    rng: &mut RandomSource,
) -> Result<Vec<SyntheticLesion>> {
    let sampler = LesionSampler::new(
        reference,
        config.expected_lesion_count,
        &config.location_label,
        config.max_lesion_count,
        &config.change,
    )?;

    let per_patient: Vec<Vec<SyntheticLesion>> = match config.seed_mode {
        SeedMode::Shared => (0..patient_count)
            .map(|p| sampler.sample_patient(p, rng))
            .collect::<Result<_>>()?,
        SeedMode::PerPatient => {
            let master = rng.seed();
            Fanout::new(config.parallel, config.threads).map_indexed(patient_count, |p| {
                let mut sub = RandomSource::for_patient(master, p);
                sampler.sample_patient(p, &mut sub)
            })?
        }
    };

    let mut lesions: Vec<SyntheticLesion> = per_patient.into_iter().flatten().collect();
    fill_derived_volumes(&mut lesions);

    info!(
        patients = patient_count,
        lesions = lesions.len(),
        seed_mode = config.seed_mode.as_str(),
        "synthetic_population_ready"
    );
    Ok(lesions)
}
