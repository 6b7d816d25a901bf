use anyhow::Result;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::ChangeDistribution;
use crate::error::SimError;

const MAX_REJECTIONS: usize = 100_000;
/// Windows lying entirely beyond this many standard deviations are rejected
/// up front.
const MAX_WINDOW_SIGMA: f64 = 8.0;

/// Normal distribution restricted to the closed interval `[low, high]`.
#[derive(Debug, Clone, Copy)]
pub struct TruncatedNormal {
    normal: Normal<f64>,
    low: f64,
    high: f64,
}

impl TruncatedNormal {
    pub fn new(params: &ChangeDistribution) -> Result<Self> {
        params.validate()?;
        let z_low = (params.low - params.mean) / params.std_dev;
        let z_high = (params.high - params.mean) / params.std_dev;
        if z_low > MAX_WINDOW_SIGMA || z_high < -MAX_WINDOW_SIGMA {
            return Err(SimError::config(format!(
                "truncation window [{}, {}] carries negligible mass for N({}, {})",
                params.low, params.high, params.mean, params.std_dev
            ))
            .into());
        }
        let normal = Normal::new(params.mean, params.std_dev)
            .map_err(|e| SimError::config(format!("invalid normal distribution: {:?}", e)))?;
        Ok(Self {
            normal,
            low: params.low,
            high: params.high,
        })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64> {
        for _ in 0..MAX_REJECTIONS {
            let v = self.normal.sample(rng);
            if v >= self.low && v <= self.high {
                return Ok(v);
            }
        }
        Err(SimError::config(format!(
            "no draw inside [{}, {}] after {} attempts",
            self.low, self.high, MAX_REJECTIONS
        ))
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn samples_stay_in_window() {
        let dist = TruncatedNormal::new(&ChangeDistribution {
            mean: 0.0,
            std_dev: 2.0,
            low: -1.0,
            high: 0.5,
        })
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..2000 {
            let v = dist.sample(&mut rng).unwrap();
            assert!((-1.0..=0.5).contains(&v));
        }
    }

    #[test]
    fn far_window_is_config_error() {
        let err = TruncatedNormal::new(&ChangeDistribution {
            mean: 0.0,
            std_dev: 0.01,
            low: 2.0,
            high: 3.0,
        })
        .unwrap_err();
        assert!(err.downcast_ref::<SimError>().unwrap().is_config());
    }
}
