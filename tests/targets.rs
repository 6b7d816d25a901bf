use std::collections::{BTreeMap, BTreeSet};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use kira_recist::config::SeedMode;
use kira_recist::error::sim_error;
use kira_recist::par::Fanout;
use kira_recist::recist::{cap_per_location, cap_total, select_targets, select_targets_with};
use kira_recist::sim::{RandomSource, SyntheticLesion};

fn lesion(patient_id: usize, lesion_idx: usize, location: &str) -> SyntheticLesion {
    let pre = 10.0 + lesion_idx as f64;
    SyntheticLesion {
        patient_id,
        lesion_idx,
        diameter_pre: pre,
        diameter_change: 0.1,
        diameter_post: pre * 1.1,
        location: location.to_string(),
        volume_cc_contoured: 0.0,
        diameter_3d_max: pre,
        diameter_major_ax: pre,
        diameter_minor_ax: pre,
        volume_cc_pre: 0.0,
        volume_cc_post: 0.0,
        volume_cc_3d_max: 0.0,
        volume_cc_major_ax: 0.0,
        volume_cc_minor_ax: 0.0,
    }
}

/// 5 LIVER, 3 LUNG and 1 BONE lesion for one patient, interleaved.
fn nine_lesions(patient_id: usize) -> Vec<SyntheticLesion> {
    let locations = [
        "LIVER", "LUNG", "LIVER", "BONE", "LIVER", "LUNG", "LIVER", "LUNG", "LIVER",
    ];
    locations
        .iter()
        .enumerate()
        .map(|(i, loc)| lesion(patient_id, i, loc))
        .collect()
}

fn per_location(lesions: &[SyntheticLesion]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for l in lesions {
        *counts.entry(l.location.clone()).or_insert(0) += 1;
    }
    counts
}

#[test]
fn location_cap_keeps_two_per_location() {
    let lesions = nine_lesions(0);
    let rows: Vec<usize> = (0..lesions.len()).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let candidates = cap_per_location(&lesions, &rows, &mut rng);
    assert_eq!(candidates.len(), 5);

    let picked: Vec<SyntheticLesion> = candidates.iter().map(|&i| lesions[i].clone()).collect();
    let counts = per_location(&picked);
    assert_eq!(counts["LIVER"], 2);
    assert_eq!(counts["LUNG"], 2);
    assert_eq!(counts["BONE"], 1);

    let capped = cap_total(&candidates, 3, &mut rng);
    assert_eq!(capped.len(), 3);
    assert!(capped.iter().all(|i| candidates.contains(i)));
    assert_eq!(cap_total(&candidates, 10, &mut rng), candidates);
}

#[test]
fn selection_respects_limits() {
    let mut lesions = nine_lesions(0);
    lesions.extend(nine_lesions(1));
    lesions.push(lesion(2, 0, "NODE"));

    let mut rng = RandomSource::from_seed(4);
    for k in [1, 3, 5, 10] {
        let targets = select_targets(k, &lesions, &mut rng).unwrap();
        let mut by_patient: BTreeMap<usize, Vec<SyntheticLesion>> = BTreeMap::new();
        for t in &targets {
            by_patient.entry(t.patient_id).or_default().push(t.clone());
        }
        assert_eq!(by_patient.len(), 3, "every patient keeps a target");
        for (patient, picked) in &by_patient {
            let cap = if *patient == 2 { 1 } else { k.min(5) };
            assert_eq!(picked.len(), cap, "patient {} k {}", patient, k);
            assert!(per_location(picked).values().all(|&n| n <= 2));
            let unique: BTreeSet<usize> = picked.iter().map(|l| l.lesion_idx).collect();
            assert_eq!(unique.len(), picked.len());
        }
    }
}

#[test]
fn selected_lesions_keep_table_order() {
    let mut lesions = nine_lesions(0);
    lesions.extend(nine_lesions(1));
    let mut rng = RandomSource::from_seed(12);
    let targets = select_targets(4, &lesions, &mut rng).unwrap();
    let keys: Vec<(usize, usize)> = targets.iter().map(|l| (l.patient_id, l.lesion_idx)).collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted);
}

#[test]
fn selection_is_deterministic_per_seed() {
    let lesions = nine_lesions(0);
    let a = select_targets(3, &lesions, &mut RandomSource::from_seed(99)).unwrap();
    let b = select_targets(3, &lesions, &mut RandomSource::from_seed(99)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn zero_targets_is_config_error() {
    let lesions = nine_lesions(0);
    let err = select_targets(0, &lesions, &mut RandomSource::from_seed(1)).unwrap_err();
    assert!(sim_error(&err).unwrap().is_config());
    let err = select_targets_with(
        0,
        &lesions,
        &mut RandomSource::from_seed(1),
        SeedMode::PerPatient,
        Fanout::sequential(),
    )
    .unwrap_err();
    assert!(sim_error(&err).unwrap().is_config());
}

#[test]
fn every_lesion_is_eventually_selected() {
    let lesions = nine_lesions(0);
    let mut rng = RandomSource::from_seed(2024);
    let mut seen = BTreeSet::new();
    for _ in 0..200 {
        for t in select_targets(3, &lesions, &mut rng).unwrap() {
            seen.insert(t.lesion_idx);
        }
    }
    assert_eq!(seen.len(), lesions.len());
}

#[test]
fn per_patient_selection_matches_across_fanout() {
    let mut lesions = Vec::new();
    for p in 0..60 {
        lesions.extend(nine_lesions(p));
    }
    let seq = select_targets_with(
        3,
        &lesions,
        &mut RandomSource::from_seed(31),
        SeedMode::PerPatient,
        Fanout::sequential(),
    )
    .unwrap();
    let par = select_targets_with(
        3,
        &lesions,
        &mut RandomSource::from_seed(31),
        SeedMode::PerPatient,
        Fanout::new(true, 4),
    )
    .unwrap();
    assert_eq!(seq, par);
    assert_eq!(seq.len(), 60 * 3);
}

#[test]
fn shared_mode_ignores_fanout() {
    let lesions = nine_lesions(0);
    let a = select_targets_with(
        2,
        &lesions,
        &mut RandomSource::from_seed(5),
        SeedMode::Shared,
        Fanout::new(true, 2),
    )
    .unwrap();
    let b = select_targets(2, &lesions, &mut RandomSource::from_seed(5)).unwrap();
    assert_eq!(a, b);
}
