//! Seeded random streams.
//!
//! A `RandomSource` owns two independent ChaCha8 streams keyed by the same
//! seed: `selection` drives lesion counts, reference-row picks and target
//! selection; `change` drives the diameter change fractions only.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const SELECTION_STREAM: u64 = 0;
const CHANGE_STREAM: u64 = 1;

const DOMAIN_GENERATE: u64 = 0x6765_6e65_7261_7465;
const DOMAIN_TARGETS: u64 = 0x7461_7267_6574_7321;

#[derive(Debug, Clone)]
pub struct RandomSource {
    seed: u64,
    selection: ChaCha8Rng,
    change: ChaCha8Rng,
}

impl RandomSource {
    pub fn from_seed(seed: u64) -> Self {
        let mut selection = ChaCha8Rng::seed_from_u64(seed);
        selection.set_stream(SELECTION_STREAM);
        let mut change = ChaCha8Rng::seed_from_u64(seed);
        change.set_stream(CHANGE_STREAM);
        Self {
            seed,
            selection,
            change,
        }
    }

    /// Sub-source for one patient's lesion generation in per-patient mode.
    pub fn for_patient(master_seed: u64, patient_id: usize) -> Self {
        Self::from_seed(derive_seed(master_seed, DOMAIN_GENERATE, 0, patient_id as u64))
    }

    /// Sub-source for one patient's target selection at one target count.
    pub fn for_targets(master_seed: u64, target_count: usize, patient_id: usize) -> Self {
        Self::from_seed(derive_seed(
            master_seed,
            DOMAIN_TARGETS,
            target_count as u64,
            patient_id as u64,
        ))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn selection(&mut self) -> &mut ChaCha8Rng {
        &mut self.selection
    }

    pub fn change(&mut self) -> &mut ChaCha8Rng {
        &mut self.change
    }
}

/// Seed used when the caller supplies none. Logged by the pipeline so the run
/// can be replayed.
pub fn entropy_seed() -> u64 {
    rand::random::<u64>()
}

pub fn derive_seed(master: u64, domain: u64, a: u64, b: u64) -> u64 {
    let mut h = splitmix64(master ^ domain);
    h = splitmix64(h ^ a);
    splitmix64(h ^ b)
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
