//! Temporally correlated exploration noise.

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

/// Ornstein-Uhlenbeck process: `dx = theta * (mu - x) + sigma * N(0, I)`.
///
/// Successive samples are correlated and revert towards `mu`, which keeps
/// the rotors pushed in a consistent direction for several steps.
#[derive(Clone, Debug)]
pub struct OUNoise {
    mu: Array1<f32>,
    pub theta: f32,
    pub sigma: f32,
    state: Array1<f32>,
    rng: StdRng,
}

impl OUNoise {
    pub fn new(size: usize, mu: f32, theta: f32, sigma: f32, rng: StdRng) -> Self {
        let mu = Array1::from_elem(size, mu);
        OUNoise {
            state: mu.clone(),
            mu,
            theta,
            sigma,
            rng,
        }
    }

    /// Build a process whose random draws are fully determined by `seed`.
    pub fn seeded(size: usize, mu: f32, theta: f32, sigma: f32, seed: u64) -> Self {
        Self::new(size, mu, theta, sigma, StdRng::seed_from_u64(seed))
    }

    /// Reset the internal state to the mean.
    pub fn reset(&mut self) {
        self.state.assign(&self.mu);
    }

    /// Replace the random source, e.g. to replay a trajectory.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Advance the process one step and return the new state.
    pub fn sample(&mut self) -> Array1<f32> {
        let (theta, sigma) = (self.theta, self.sigma);
        let rng = &mut self.rng;
        ndarray::Zip::from(&mut self.state)
            .and(&self.mu)
            .for_each(|x, &mu| {
                let epsilon: f32 = StandardNormal.sample(rng);
                *x += theta * (mu - *x) + sigma * epsilon;
            });
        self.state.clone()
    }

    pub fn state(&self) -> &Array1<f32> {
        &self.state
    }

    pub fn size(&self) -> usize {
        self.mu.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_returns_to_mean() {
        let mut noise = OUNoise::seeded(4, 0.5, 0.35, 0.1, 3);
        for _ in 0..10 {
            noise.sample();
        }
        noise.reset();
        assert!(noise.state().iter().all(|&x| x == 0.5));
    }

    #[test]
    fn test_zero_sigma_decays_towards_mean() {
        let mut noise = OUNoise::seeded(2, 0.0, 0.5, 0.0, 3);
        noise.state.fill(8.0);
        let first = noise.sample();
        assert_eq!(first, Array1::from_elem(2, 4.0));
        let second = noise.sample();
        assert_eq!(second, Array1::from_elem(2, 2.0));
    }

    #[test]
    fn test_sample_changes_state() {
        let mut noise = OUNoise::seeded(4, 0.0, 0.35, 0.1, 11);
        let sample = noise.sample();
        assert_eq!(&sample, noise.state());
        assert!(sample.iter().any(|&x| x != 0.0));
    }
}
