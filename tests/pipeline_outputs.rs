use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

use kira_recist::config::SimConfig;
use kira_recist::ctx::Ctx;
use kira_recist::error::sim_error;
use kira_recist::pipeline::Pipeline;

const HEADER: &str = "id,original_shape_Maximum2DDiameterSlice,original_shape_Maximum3DDiameter,original_shape_MajorAxisLength,original_shape_MinorAxisLength,original_shape_VoxelVolume,diagnostics_Image-interpolated_Spacing,LABEL";

fn write_reference(root: &Path) -> PathBuf {
    let dir = root.join("DS");
    fs::create_dir_all(&dir).unwrap();
    let locations = ["LIVER", "LUNG", "BONE", "NODE", "ADRENAL"];
    let mut csv = String::from(HEADER);
    csv.push('\n');
    for i in 0..25 {
        let d = 8.0 + (i * 13 % 37) as f64;
        csv.push_str(&format!(
            "r{},{},{},{},{},{},\"(0.8, 0.8, 3.0)\",{}\n",
            i,
            d,
            d * 1.2,
            d * 1.1,
            d * 0.7,
            d * d * d * 0.4,
            locations[i % locations.len()]
        ));
    }
    let path = dir.join("radiomics.csv");
    fs::write(&path, csv).unwrap();
    path
}

fn run_dir(out: &Path, patients: usize) -> PathBuf {
    out.join("DS").join(format!("sim_{}_pats", patients))
}

fn run(input: &Path, out: &Path, extra: &[&str]) {
    let mut cmd = Command::cargo_bin("kira-recist").unwrap();
    cmd.arg("run")
        .arg("--input")
        .arg(input)
        .arg("--out")
        .arg(out)
        .args(["--patients", "50", "--seed", "7"])
        .args(extra);
    cmd.assert().success();
}

#[test]
fn run_writes_expected_layout() {
    let tmp = TempDir::new().unwrap();
    let input = write_reference(tmp.path());
    let out = tmp.path().join("out");
    run(&input, &out, &[]);

    let dir = run_dir(&out, 50);
    for name in [
        "DS_synthetic_lesions.csv",
        "DS_synthetic_patient_response.csv",
        "recist_metrics.tsv",
        "summary.json",
    ] {
        assert!(dir.join(name).exists(), "missing {}", name);
    }

    let responses = fs::read_to_string(dir.join("DS_synthetic_patient_response.csv")).unwrap();
    let header = responses.lines().next().unwrap();
    assert!(header.ends_with("RECIST (all),RECIST (1 targets),RECIST (2 targets),RECIST (3 targets),RECIST (4 targets),RECIST (5 targets),RECIST (6 targets),RECIST (7 targets),RECIST (8 targets),RECIST (9 targets),RECIST (10 targets)"));
    assert_eq!(responses.lines().count(), 51);

    let metrics = fs::read_to_string(dir.join("recist_metrics.tsv")).unwrap();
    assert_eq!(metrics.lines().count(), 11);

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["tool"], "kira-recist");
    assert_eq!(summary["seed"], 7);
    assert_eq!(summary["cohort"]["patients"], 50);
    assert_eq!(summary["input"]["dataset"], "DS");
    assert_eq!(summary["metrics"].as_array().unwrap().len(), 10);
}

#[test]
fn seeded_runs_are_byte_identical() {
    let tmp = TempDir::new().unwrap();
    let input = write_reference(tmp.path());
    let out_a = tmp.path().join("a");
    let out_b = tmp.path().join("b");
    run(&input, &out_a, &[]);
    run(&input, &out_b, &[]);

    for name in [
        "DS_synthetic_lesions.csv",
        "DS_synthetic_patient_response.csv",
        "recist_metrics.tsv",
        "summary.json",
    ] {
        let a = fs::read(run_dir(&out_a, 50).join(name)).unwrap();
        let b = fs::read(run_dir(&out_b, 50).join(name)).unwrap();
        assert_eq!(a, b, "{} differs between runs", name);
    }
}

#[test]
fn parallel_per_patient_matches_sequential() {
    let tmp = TempDir::new().unwrap();
    let input = write_reference(tmp.path());
    let out_seq = tmp.path().join("seq");
    let out_par = tmp.path().join("par");
    run(&input, &out_seq, &["--seed-mode", "per-patient"]);
    run(
        &input,
        &out_par,
        &["--seed-mode", "per-patient", "--parallel", "--threads", "3"],
    );

    for name in [
        "DS_synthetic_lesions.csv",
        "DS_synthetic_patient_response.csv",
        "recist_metrics.tsv",
    ] {
        let a = fs::read(run_dir(&out_seq, 50).join(name)).unwrap();
        let b = fs::read(run_dir(&out_par, 50).join(name)).unwrap();
        assert_eq!(a, b, "{} differs with --parallel", name);
    }
}

#[test]
fn no_write_leaves_output_untouched() {
    let tmp = TempDir::new().unwrap();
    let input = write_reference(tmp.path());
    let out = tmp.path().join("out");
    let mut cmd = Command::cargo_bin("kira-recist").unwrap();
    cmd.arg("run")
        .arg("--input")
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .args(["--patients", "20", "--seed", "1", "--no-write"]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8(output).unwrap();
    assert!(stdout.contains("Cohort: 20 patients"));
    assert!(!out.exists());
}

#[test]
fn validate_reports_locations() {
    let tmp = TempDir::new().unwrap();
    let input = write_reference(tmp.path());
    let mut cmd = Command::cargo_bin("kira-recist").unwrap();
    cmd.arg("validate").arg("--input").arg(&input);
    let output = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8(output).unwrap();
    assert!(stdout.contains("kira-recist validate ok"));
    assert!(stdout.contains("rows: 25"));
    assert!(stdout.contains("locations: 5"));
    assert!(stdout.contains("LIVER\t5"));
}

#[test]
fn validate_fails_on_missing_location_label() {
    let tmp = TempDir::new().unwrap();
    let input = write_reference(tmp.path());
    let mut cmd = Command::cargo_bin("kira-recist").unwrap();
    cmd.arg("validate")
        .arg("--input")
        .arg(&input)
        .args(["--location-label", "ORGAN"]);
    cmd.assert().failure();
}

#[test]
fn pipeline_stops_on_missing_location_column() {
    let tmp = TempDir::new().unwrap();
    let input = write_reference(tmp.path());
    let config = SimConfig {
        patient_count: 10,
        random_seed: Some(3),
        location_label: "ORGAN".to_string(),
        ..SimConfig::default()
    };
    let mut ctx = Ctx::new(input, tmp.path().join("out"), config, false, "test");
    let err = Pipeline::simulation().run(&mut ctx).unwrap_err();
    assert!(sim_error(&err).unwrap().is_config());
    assert!(ctx.lesions.is_empty());
}

#[test]
fn pipeline_rejects_invalid_config() {
    let tmp = TempDir::new().unwrap();
    let input = write_reference(tmp.path());
    let config = SimConfig {
        patient_count: 0,
        ..SimConfig::default()
    };
    let mut ctx = Ctx::new(input, tmp.path().join("out"), config, false, "test");
    let err = Pipeline::simulation().run(&mut ctx).unwrap_err();
    assert!(sim_error(&err).unwrap().is_config());
}

#[test]
fn in_process_run_fills_report() {
    let tmp = TempDir::new().unwrap();
    let input = write_reference(tmp.path());
    let config = SimConfig {
        patient_count: 30,
        random_seed: Some(11),
        max_target_count: 4,
        ..SimConfig::default()
    };
    let mut ctx = Ctx::new(input, tmp.path().join("out"), config, false, "test");
    let pipeline = Pipeline::simulation();
    assert_eq!(pipeline.stage_names().len(), 7);
    pipeline.run(&mut ctx).unwrap();

    let table = ctx.responses.as_ref().unwrap();
    assert_eq!(table.len(), 30);
    assert_eq!(table.target_counts, vec![1, 2, 3, 4]);
    assert_eq!(ctx.sweep.as_ref().unwrap().points.len(), 4);
    assert_eq!(ctx.report.cohort.lesions as usize, ctx.lesions.len());
    let total: u64 = ctx.report.categories.values().sum();
    assert_eq!(total, 30);
    assert!(ctx.report.artifacts.lesions.is_none());
}
