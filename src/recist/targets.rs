use std::collections::BTreeMap;

use anyhow::Result;
use rand::Rng;
use rand::seq::index;

use crate::config::SeedMode;
use crate::error::SimError;
use crate::par::Fanout;
use crate::recist::{MAX_TARGETS_PER_LOCATION, patient_groups};
use crate::sim::{RandomSource, SyntheticLesion};

/// Step 1: keeps at most two rows per location.
///
/// `rows` index into `lesions` and belong to one patient. Locations are visited
/// in sorted order; rows of a capped location are drawn without replacement
/// and returned in table order within that location.
pub fn cap_per_location<R: Rng + ?Sized>(
    lesions: &[SyntheticLesion],
    rows: &[usize],
    rng: &mut R,
) -> Vec<usize> {
    let mut by_location: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for &r in rows {
        by_location
            .entry(lesions[r].location.as_str())
            .or_default()
            .push(r);
    }

    let mut out = Vec::with_capacity(rows.len());
    for (_location, group) in by_location {
        if group.len() > MAX_TARGETS_PER_LOCATION {
            let mut picked: Vec<usize> = index::sample(rng, group.len(), MAX_TARGETS_PER_LOCATION)
                .into_iter()
                .map(|i| group[i])
                .collect();
            picked.sort_unstable();
            out.extend(picked);
        } else {
            out.extend(group);
        }
    }
    out
}

/// Step 2: keeps exactly `target_count` candidates when there are more,
/// drawn without replacement; otherwise all of them.
pub fn cap_total<R: Rng + ?Sized>(
    candidates: &[usize],
    target_count: usize,
    rng: &mut R,
) -> Vec<usize> {
    if candidates.len() <= target_count {
        return candidates.to_vec();
    }
    index::sample(rng, candidates.len(), target_count)
        .into_iter()
        .map(|i| candidates[i])
        .collect()
}

fn select_patient<R: Rng + ?Sized>(
    lesions: &[SyntheticLesion],
    rows: &[usize],
    target_count: usize,
    rng: &mut R,
) -> Vec<usize> {
    let candidates = cap_per_location(lesions, rows, rng);
    cap_total(&candidates, target_count, rng)
}

/// Target lesions for every patient, drawn from the shared selection stream,
/// in original row order.
pub fn select_targets(
    target_count: usize,
    lesions: &[SyntheticLesion],
    rng: &mut RandomSource,
) -> Result<Vec<SyntheticLesion>> {
    check_target_count(target_count)?;
    let mut picked = Vec::new();
    for (_patient, rows) in patient_groups(lesions) {
        picked.extend(select_patient(lesions, &rows, target_count, rng.selection()));
    }
    Ok(materialize(lesions, picked))
}

/// Like `select_targets`, honouring the seed mode.
///
/// `SeedMode::PerPatient` gives each (target count, patient) pair its own
/// sub-stream derived from `rng.seed()`, which is what allows `fanout` to run
/// patients concurrently. `SeedMode::Shared` always draws sequentially.
pub fn select_targets_with(
    target_count: usize,
    lesions: &[SyntheticLesion],
    rng: &mut RandomSource,
    seed_mode: SeedMode,
    fanout: Fanout,
) -> Result<Vec<SyntheticLesion>> {
    match seed_mode {
        SeedMode::Shared => select_targets(target_count, lesions, rng),
        SeedMode::PerPatient => {
            check_target_count(target_count)?;
            let master = rng.seed();
            let groups = patient_groups(lesions);
            let per_patient = fanout.map_indexed(groups.len(), |g| {
                let (patient_id, rows) = &groups[g];
                let mut sub = RandomSource::for_targets(master, target_count, *patient_id);
                Ok(select_patient(lesions, rows, target_count, sub.selection()))
            })?;
            Ok(materialize(lesions, per_patient.into_iter().flatten().collect()))
        }
    }
}

fn check_target_count(target_count: usize) -> Result<()> {
    if target_count == 0 {
        return Err(SimError::config("target count must be at least 1").into());
    }
    Ok(())
}

fn materialize(lesions: &[SyntheticLesion], mut picked: Vec<usize>) -> Vec<SyntheticLesion> {
    picked.sort_unstable();
    picked.into_iter().map(|i| lesions[i].clone()).collect()
}
