use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use crate::activations::Activation;
use crate::error::{DdpgError, Result};
use crate::layers::DenseLayer;
use crate::loss::Loss;
use crate::optimizer::{Optimizer, OptimizerWrapper};

/// Parameter gradients for every layer plus the error at the network input.
pub struct NetworkGradients {
    /// `(weight_gradients, bias_gradients)` per layer, input layer first
    pub layers: Vec<(Array2<f32>, Array1<f32>)>,
    /// Gradient of the backpropagated quantity with respect to the input,
    /// shape `[batch, input_size]`
    pub input_error: Array2<f32>,
}

/// A feed-forward network of dense layers together with the optimizer that
/// trains it.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
    pub optimizer: OptimizerWrapper,
}

impl NeuralNetwork {
    /// Create a new neural network with the given layer sizes, activations and optimizer.
    /// `layer_sizes` includes the input width, so it must hold one more entry
    /// than `activations`.
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activations: &[Activation],
        optimizer: OptimizerWrapper,
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 || layer_sizes.len() - 1 != activations.len() {
            return Err(DdpgError::invalid_parameter(
                "layer_sizes".to_string(),
                format!(
                    "{} layer sizes cannot be paired with {} activations",
                    layer_sizes.len(),
                    activations.len()
                ),
            ));
        }
        if layer_sizes.iter().any(|&size| size == 0) {
            return Err(DdpgError::invalid_parameter("layer_sizes", "layer widths must be positive"));
        }

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| DenseLayer::new(window[0], window[1], activation, rng))
            .collect::<Result<Vec<_>>>()?;

        Ok(NeuralNetwork { layers, optimizer })
    }

    /// Replace the layers, keeping the optimizer. Each layer must consume the
    /// previous layer's output width.
    pub fn with_layers(mut self, layers: Vec<DenseLayer>) -> Result<Self> {
        if layers.is_empty() {
            return Err(DdpgError::invalid_parameter("layers", "a network needs at least one layer"));
        }
        for pair in layers.windows(2) {
            if pair[0].output_size() != pair[1].input_size() {
                return Err(DdpgError::dimension_mismatch(
                    format!("layer input width {}", pair[0].output_size()),
                    format!("layer input width {}", pair[1].input_size()),
                ));
            }
        }
        self.layers = layers;
        Ok(self)
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::output_size)
    }

    /// Total number of trainable scalars.
    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(|l| l.weights.len() + l.biases.len()).sum()
    }

    fn check_input(&self, width: usize) -> Result<()> {
        if width != self.input_size() {
            return Err(DdpgError::dimension_mismatch(
                format!("input width {}", self.input_size()),
                format!("input width {}", width),
            ));
        }
        Ok(())
    }

    /// Forward pass for a single input vector. Nothing is cached, so this can
    /// be called on a shared reference.
    pub fn predict(&self, input: ArrayView1<f32>) -> Result<Array1<f32>> {
        let output = self.predict_batch(input.insert_axis(Axis(0)))?;
        Ok(output.index_axis_move(Axis(0), 0))
    }

    /// Forward pass for a batch of input vectors without caching.
    pub fn predict_batch(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(inputs.ncols())?;
        let mut current_output = inputs.to_owned();
        for layer in &self.layers {
            current_output = layer.predict_batch(current_output.view());
        }
        Ok(current_output)
    }

    /// Forward pass for a batch, caching what [`NeuralNetwork::backward_batch`] needs.
    pub fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(inputs.ncols())?;
        let mut current_output = inputs.to_owned();
        for layer in &mut self.layers {
            current_output = layer.forward_batch(current_output.view());
        }
        Ok(current_output)
    }

    /// Backpropagate `output_errors` (the gradient of some scalar with
    /// respect to the network output) through every layer.
    pub fn backward_batch(&self, output_errors: ArrayView2<f32>) -> Result<NetworkGradients> {
        let mut layers = Vec::with_capacity(self.layers.len());
        let mut current_error = output_errors.to_owned();

        for layer in self.layers.iter().rev() {
            let grads = layer.backward_batch(current_error.view())?;
            layers.push((grads.weights, grads.biases));
            current_error = grads.input_error;
        }

        layers.reverse();
        Ok(NetworkGradients { layers, input_error: current_error })
    }

    /// Apply one optimizer step using precomputed gradients.
    pub fn apply_gradients(&mut self, gradients: &NetworkGradients, learning_rate: f32) -> Result<()> {
        if gradients.layers.len() != self.layers.len() {
            return Err(DdpgError::dimension_mismatch(
                format!("{} layer gradients", self.layers.len()),
                format!("{} layer gradients", gradients.layers.len()),
            ));
        }

        self.optimizer.advance();
        for (index, (layer, (weight_gradients, bias_gradients))) in
            self.layers.iter_mut().zip(&gradients.layers).enumerate()
        {
            self.optimizer.update_weights(index, &mut layer.weights, weight_gradients, learning_rate);
            self.optimizer.update_biases(index, &mut layer.biases, bias_gradients, learning_rate);
        }
        Ok(())
    }

    /// Train the neural network on a batch of inputs and targets, returning the
    /// loss measured before the update.
    pub fn train_minibatch(
        &mut self,
        inputs: ArrayView2<f32>,
        targets: ArrayView2<f32>,
        loss: &dyn Loss,
        learning_rate: f32,
    ) -> Result<f32> {
        let outputs = self.forward_batch(inputs)?;
        if outputs.dim() != targets.dim() {
            return Err(DdpgError::dimension_mismatch(
                format!("{:?}", outputs.dim()),
                format!("{:?}", targets.dim()),
            ));
        }
        let value = loss.compute_batch(outputs.view(), targets);
        let output_errors = loss.gradient_batch(outputs.view(), targets);
        let gradients = self.backward_batch(output_errors.view())?;
        self.apply_gradients(&gradients, learning_rate)?;
        Ok(value)
    }

    /// Save the neural network's state to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = bincode::serialize(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(&serialized)?;
        Ok(())
    }

    /// Load a neural network from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = fs::File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Ok(bincode::deserialize(&buffer)?)
    }
}

/// Move every parameter of `target` towards `local`:
/// `target <- tau * local + (1 - tau) * target`.
///
/// Both networks must have the same layer count and parameter shapes.
pub fn soft_update(local: &NeuralNetwork, target: &mut NeuralNetwork, tau: f32) -> Result<()> {
    if local.layers.len() != target.layers.len() {
        return Err(DdpgError::dimension_mismatch(
            format!("{} layers", local.layers.len()),
            format!("{} layers", target.layers.len()),
        ));
    }
    for (source, dest) in local.layers.iter().zip(target.layers.iter()) {
        if source.weights.dim() != dest.weights.dim() {
            return Err(DdpgError::dimension_mismatch(
                format!("weights {:?}", source.weights.dim()),
                format!("weights {:?}", dest.weights.dim()),
            ));
        }
        if source.biases.dim() != dest.biases.dim() {
            return Err(DdpgError::dimension_mismatch(
                format!("biases {:?}", source.biases.dim()),
                format!("biases {:?}", dest.biases.dim()),
            ));
        }
    }

    for (source, dest) in local.layers.iter().zip(target.layers.iter_mut()) {
        dest.weights.zip_mut_with(&source.weights, |t, &l| *t = tau * l + (1.0 - tau) * *t);
        dest.biases.zip_mut_with(&source.biases, |t, &l| *t = tau * l + (1.0 - tau) * *t);
    }
    Ok(())
}
