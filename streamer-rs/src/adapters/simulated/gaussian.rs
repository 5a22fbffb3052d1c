use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use common::types::XYZ;

/// Functionality to add some Gaussian noise.
#[derive(Clone)]
pub(super) struct GaussianNoise {
    normal: Normal<f64>,
}

impl GaussianNoise {
    /// Creates new distribution from mean and stdev. Fails if stdev is negative or not
    /// finite.
    pub(super) fn new(mean: f64, stdev: f64) -> Result<Self, String> {
        let normal = Normal::new(mean, stdev).map_err(|e| e.to_string())?;
        Ok(Self { normal })
    }

    /// Sample from distribution
    pub(super) fn draw_sample(&self, rng: &mut StdRng) -> f64 {
        self.normal.sample(rng)
    }

    /// Adds independent noise to each axis
    pub(super) fn add_noise_xyz(&self, rng: &mut StdRng, data: XYZ) -> XYZ {
        XYZ::new([
            data.x() + self.draw_sample(rng),
            data.y() + self.draw_sample(rng),
            data.z() + self.draw_sample(rng),
        ])
    }
}
