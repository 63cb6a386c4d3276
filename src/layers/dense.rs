use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{DdpgError, Result};
use super::initialization::WeightInit;

/// Gradients produced by one backward pass through a dense layer.
pub struct LayerGradients {
    /// Error propagated to the layer input, shape `[batch, input_size]`
    pub input_error: Array2<f32>,
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
}

/// A fully connected (dense) layer in a neural network
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
    #[serde(skip)]
    pre_activation_output: Option<Array2<f32>>,
    #[serde(skip)]
    inputs: Option<Array2<f32>>,
}

impl DenseLayer {
    /// Create a new dense layer, initialising the weights with the scheme
    /// recommended for `activation`.
    pub fn new<R: Rng + ?Sized>(input_size: usize, output_size: usize, activation: Activation, rng: &mut R) -> Result<Self> {
        Self::with_init(input_size, output_size, activation, WeightInit::for_activation(&activation), rng)
    }

    /// Create a new dense layer with an explicit initialisation scheme.
    pub fn with_init<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        init: WeightInit,
        rng: &mut R,
    ) -> Result<Self> {
        Ok(DenseLayer {
            weights: init.initialize_weights((input_size, output_size), rng)?,
            biases: init.initialize_biases(output_size),
            activation,
            pre_activation_output: None,
            inputs: None,
        })
    }

    pub fn with_weights(mut self, weights: Array2<f32>) -> Result<Self> {
        if weights.dim() != self.weights.dim() {
            return Err(DdpgError::dimension_mismatch(
                format!("{:?}", self.weights.dim()),
                format!("{:?}", weights.dim()),
            ));
        }
        self.weights = weights;
        Ok(self)
    }

    pub fn with_biases(mut self, biases: Array1<f32>) -> Result<Self> {
        if biases.dim() != self.biases.dim() {
            return Err(DdpgError::dimension_mismatch(
                format!("{:?}", self.biases.dim()),
                format!("{:?}", biases.dim()),
            ));
        }
        self.biases = biases;
        Ok(self)
    }

    pub fn input_size(&self) -> usize {
        self.weights.shape()[0]
    }

    pub fn output_size(&self) -> usize {
        self.weights.shape()[1]
    }

    /// Forward pass without caching anything for a later backward pass.
    pub fn predict_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut outputs = inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0));
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Forward pass for a batch, keeping inputs and pre-activations for
    /// [`DenseLayer::backward_batch`].
    pub fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Array2<f32> {
        self.inputs = Some(inputs.to_owned());
        let mut outputs = inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0));
        self.pre_activation_output = Some(outputs.clone());
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Compute gradients for the layer's weights and biases, and the error at
    /// the layer input, given the error at the layer output.
    pub fn backward_batch(&self, output_errors: ArrayView2<f32>) -> Result<LayerGradients> {
        let (pre_activation_output, inputs) = match (&self.pre_activation_output, &self.inputs) {
            (Some(pre), Some(inputs)) => (pre, inputs),
            _ => {
                return Err(DdpgError::Training(
                    "forward_batch() must be called before backward_batch()".to_string(),
                ))
            }
        };
        if output_errors.dim() != pre_activation_output.dim() {
            return Err(DdpgError::dimension_mismatch(
                format!("{:?}", pre_activation_output.dim()),
                format!("{:?}", output_errors.dim()),
            ));
        }

        let activation_deriv = self.activation.derivative_batch(pre_activation_output.view());
        let adjusted_error = &output_errors * &activation_deriv;

        Ok(LayerGradients {
            input_error: adjusted_error.dot(&self.weights.t()),
            weights: inputs.t().dot(&adjusted_error),
            biases: adjusted_error.sum_axis(Axis(0)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn linear_layer() -> DenseLayer {
        let mut rng = StdRng::seed_from_u64(0);
        DenseLayer::new(2, 1, Activation::Linear, &mut rng)
            .unwrap()
            .with_weights(array![[2.0], [-1.0]])
            .unwrap()
            .with_biases(array![0.5])
            .unwrap()
    }

    #[test]
    fn test_forward_matches_predict() {
        let mut layer = linear_layer();
        let x = array![[1.0, 3.0], [0.0, 1.0]];
        let cached = layer.forward_batch(x.view());
        assert_eq!(cached, layer.predict_batch(x.view()));
        assert_eq!(cached, array![[-0.5], [-0.5]]);
    }

    #[test]
    fn test_backward_input_error_is_weights() {
        let mut layer = linear_layer();
        layer.forward_batch(array![[1.0, 3.0]].view());
        let grads = layer.backward_batch(array![[1.0]].view()).unwrap();
        assert_eq!(grads.input_error, array![[2.0, -1.0]]);
        assert_eq!(grads.weights, array![[1.0], [3.0]]);
        assert_eq!(grads.biases, array![1.0]);
    }

    #[test]
    fn test_backward_before_forward_fails() {
        let layer = linear_layer();
        assert!(layer.backward_batch(array![[1.0]].view()).is_err());
    }

    #[test]
    fn test_with_weights_rejects_wrong_shape() {
        let mut rng = StdRng::seed_from_u64(0);
        let layer = DenseLayer::new(2, 3, Activation::Relu, &mut rng).unwrap();
        assert!(layer.with_weights(Array2::zeros((3, 2))).is_err());
    }

    #[test]
    fn test_with_init_rejects_empty_uniform_range() {
        let mut rng = StdRng::seed_from_u64(0);
        let result = DenseLayer::with_init(2, 3, Activation::Relu, WeightInit::Uniform { min: 1.0, max: 0.0 }, &mut rng);
        assert!(result.is_err());
    }
}
