pub mod generator;
pub mod rng;
pub mod truncnorm;

pub use generator::{LesionSampler, generate_patient_lesions, generate_population};
pub use rng::RandomSource;
pub use truncnorm::TruncatedNormal;

/// Sphere volume in cubic centimetres for a diameter in millimetres.
pub fn volume_cc(diameter: f64) -> f64 {
    let r = diameter / 2.0;
    (4.0 / 3.0 * std::f64::consts::PI * r * r * r) / 1000.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticLesion {
    pub patient_id: usize,
    pub lesion_idx: usize,
    pub diameter_pre: f64,
    pub diameter_change: f64,
    pub diameter_post: f64,
    pub location: String,
    pub volume_cc_contoured: f64,
    pub diameter_3d_max: f64,
    pub diameter_major_ax: f64,
    pub diameter_minor_ax: f64,
    pub volume_cc_pre: f64,
    pub volume_cc_post: f64,
    pub volume_cc_3d_max: f64,
    pub volume_cc_major_ax: f64,
    pub volume_cc_minor_ax: f64,
}

/// Fills the sphere-volume columns for every lesion of a table.
pub fn fill_derived_volumes(lesions: &mut [SyntheticLesion]) {
    for l in lesions.iter_mut() {
        l.volume_cc_pre = volume_cc(l.diameter_pre);
        l.volume_cc_post = volume_cc(l.diameter_post);
        l.volume_cc_3d_max = volume_cc(l.diameter_3d_max);
        l.volume_cc_major_ax = volume_cc(l.diameter_major_ax);
        l.volume_cc_minor_ax = volume_cc(l.diameter_minor_ax);
    }
}
