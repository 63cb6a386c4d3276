use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::error::{DdpgError, Result};
use crate::network::NeuralNetwork;
use crate::optimizer::OptimizerWrapper;

/// Deterministic policy `state -> action` with every action dimension kept
/// inside `[action_low, action_high]`.
///
/// The network ends in a bounded activation whose output is rescaled
/// affinely onto the action range.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Actor {
    network: NeuralNetwork,
    pub state_size: usize,
    pub action_size: usize,
    pub action_low: f32,
    pub action_high: f32,
    output_low: f32,
    output_high: f32,
}

impl Actor {
    /// Create an actor with ReLU hidden layers and a Sigmoid output.
    pub fn new<R: Rng + ?Sized>(
        state_size: usize,
        action_size: usize,
        hidden_sizes: &[usize],
        action_low: f32,
        action_high: f32,
        optimizer: OptimizerWrapper,
        rng: &mut R,
    ) -> Result<Self> {
        Self::with_output_activation(
            state_size,
            action_size,
            hidden_sizes,
            action_low,
            action_high,
            Activation::Sigmoid,
            optimizer,
            rng,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_output_activation<R: Rng + ?Sized>(
        state_size: usize,
        action_size: usize,
        hidden_sizes: &[usize],
        action_low: f32,
        action_high: f32,
        output_activation: Activation,
        optimizer: OptimizerWrapper,
        rng: &mut R,
    ) -> Result<Self> {
        if !(action_low < action_high) {
            return Err(DdpgError::invalid_parameter(
                "action_high".to_string(),
                format!("{} must exceed action_low {}", action_high, action_low),
            ));
        }
        let (output_low, output_high) = output_activation.output_range().ok_or_else(|| {
            DdpgError::invalid_parameter(
                "output_activation".to_string(),
                format!("{:?} is unbounded and cannot be rescaled onto the action range", output_activation),
            )
        })?;

        let mut sizes = vec![state_size];
        sizes.extend_from_slice(hidden_sizes);
        sizes.push(action_size);

        let activations = vec![Activation::Relu; hidden_sizes.len()]
            .into_iter()
            .chain(std::iter::once(output_activation))
            .collect::<Vec<_>>();

        let network = NeuralNetwork::new(&sizes, &activations, optimizer, rng)?;

        Ok(Actor {
            network,
            state_size,
            action_size,
            action_low,
            action_high,
            output_low,
            output_high,
        })
    }

    /// d(action) / d(raw network output)
    fn scale(&self) -> f32 {
        (self.action_high - self.action_low) / (self.output_high - self.output_low)
    }

    fn rescale(&self, mut raw: Array2<f32>) -> Array2<f32> {
        let (scale, output_low, action_low) = (self.scale(), self.output_low, self.action_low);
        raw.mapv_inplace(|y| action_low + (y - output_low) * scale);
        raw
    }

    pub fn predict(&self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        let raw = self.network.predict(state)?;
        let (scale, output_low, action_low) = (self.scale(), self.output_low, self.action_low);
        Ok(raw.mapv(|y| action_low + (y - output_low) * scale))
    }

    pub fn predict_batch(&self, states: ArrayView2<f32>) -> Result<Array2<f32>> {
        let raw = self.network.predict_batch(states)?;
        Ok(self.rescale(raw))
    }

    /// One gradient-ascent step on `mean_b Q(s_b, pi(s_b))`.
    ///
    /// `action_gradients[b]` is `dQ/da` evaluated at `(states[b], actions[b])`,
    /// as returned by [`crate::algorithms::Critic::action_gradients`].
    pub fn train(
        &mut self,
        states: ArrayView2<f32>,
        action_gradients: ArrayView2<f32>,
        learning_rate: f32,
    ) -> Result<()> {
        if action_gradients.dim() != (states.nrows(), self.action_size) {
            return Err(DdpgError::dimension_mismatch(
                format!("({}, {})", states.nrows(), self.action_size),
                format!("{:?}", action_gradients.dim()),
            ));
        }
        self.network.forward_batch(states)?;

        // Minimising -Q: the output error is -dQ/da * da/dy, averaged over the batch
        let batch = states.nrows().max(1) as f32;
        let output_errors = action_gradients.mapv(|g| -g * self.scale() / batch);

        let gradients = self.network.backward_batch(output_errors.view())?;
        self.network.apply_gradients(&gradients, learning_rate)
    }

    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut NeuralNetwork {
        &mut self.network
    }
}
