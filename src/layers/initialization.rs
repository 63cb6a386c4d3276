use ndarray::{Array2, Array1};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{DdpgError, Result};

/// Weight initialization strategies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeightInit {
    /// Xavier/Glorot uniform initialization
    XavierUniform,

    /// He/Kaiming uniform initialization (for ReLU)
    HeUniform,

    /// Uniform distribution with custom range
    Uniform { min: f32, max: f32 },

    /// All zeros
    Zeros,
}

impl WeightInit {
    /// Initialize weights for a layer of shape `(fan_in, fan_out)`.
    /// A custom `Uniform` range must satisfy `min < max`.
    pub fn initialize_weights<R: Rng + ?Sized>(&self, shape: (usize, usize), rng: &mut R) -> Result<Array2<f32>> {
        let (fan_in, fan_out) = shape;

        let weights = match self {
            WeightInit::XavierUniform => {
                let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
                Array2::random_using(shape, Uniform::new(-limit, limit), rng)
            }

            WeightInit::HeUniform => {
                let limit = (6.0 / fan_in.max(1) as f32).sqrt();
                Array2::random_using(shape, Uniform::new(-limit, limit), rng)
            }

            WeightInit::Uniform { min, max } => {
                if !(min < max) || !min.is_finite() || !max.is_finite() {
                    return Err(DdpgError::invalid_parameter(
                        "WeightInit::Uniform".to_string(),
                        format!("range [{}, {}) is empty or not finite", min, max),
                    ));
                }
                Array2::random_using(shape, Uniform::new(*min, *max), rng)
            }

            WeightInit::Zeros => Array2::zeros(shape),
        };
        Ok(weights)
    }

    /// Initialize biases for a layer. Biases start at zero for every scheme.
    pub fn initialize_biases(&self, size: usize) -> Array1<f32> {
        Array1::zeros(size)
    }

    /// Get the recommended initialization for an activation function
    pub fn for_activation(activation: &Activation) -> Self {
        match activation {
            Activation::Relu => WeightInit::HeUniform,
            Activation::Sigmoid | Activation::Tanh | Activation::Linear => WeightInit::XavierUniform,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_he_uniform_limits() {
        let mut rng = StdRng::seed_from_u64(7);
        let w = WeightInit::HeUniform.initialize_weights((24, 8), &mut rng).unwrap();
        let limit = (6.0f32 / 24.0).sqrt();
        assert_eq!(w.dim(), (24, 8));
        assert!(w.iter().all(|&v| v.abs() <= limit));
    }

    #[test]
    fn test_same_seed_same_weights() {
        let a = WeightInit::XavierUniform.initialize_weights((4, 4), &mut StdRng::seed_from_u64(1)).unwrap();
        let b = WeightInit::XavierUniform.initialize_weights((4, 4), &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_custom_uniform_range() {
        let mut rng = StdRng::seed_from_u64(2);
        let w = WeightInit::Uniform { min: 0.5, max: 0.75 }.initialize_weights((10, 10), &mut rng).unwrap();
        assert!(w.iter().all(|&v| (0.5..0.75).contains(&v)));
    }

    #[test]
    fn test_empty_uniform_range_rejected() {
        let mut rng = StdRng::seed_from_u64(2);
        for (min, max) in [(1.0, 1.0), (2.0, -2.0), (f32::NAN, 1.0)] {
            let result = WeightInit::Uniform { min, max }.initialize_weights((2, 2), &mut rng);
            assert!(matches!(result, Err(DdpgError::InvalidParameter { .. })));
        }
    }

    #[test]
    fn test_zeros() {
        let w = WeightInit::Zeros.initialize_weights((3, 2), &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(w, Array2::<f32>::zeros((3, 2)));
        assert_eq!(WeightInit::Zeros.initialize_biases(2), Array1::<f32>::zeros(2));
    }
}
