use ndarray::{concatenate, s, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::error::{DdpgError, Result};
use crate::loss::MSE;
use crate::network::NeuralNetwork;
use crate::optimizer::OptimizerWrapper;

/// Action-value function `Q(state, action)`.
///
/// State and action are concatenated and fed through ReLU hidden layers to
/// a single linear output.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Critic {
    network: NeuralNetwork,
    pub state_size: usize,
    pub action_size: usize,
}

impl Critic {
    pub fn new<R: Rng + ?Sized>(
        state_size: usize,
        action_size: usize,
        hidden_sizes: &[usize],
        optimizer: OptimizerWrapper,
        rng: &mut R,
    ) -> Result<Self> {
        let mut sizes = vec![state_size + action_size];
        sizes.extend_from_slice(hidden_sizes);
        sizes.push(1);

        let activations = vec![Activation::Relu; hidden_sizes.len()]
            .into_iter()
            .chain(std::iter::once(Activation::Linear))
            .collect::<Vec<_>>();

        let network = NeuralNetwork::new(&sizes, &activations, optimizer, rng)?;
        Ok(Critic { network, state_size, action_size })
    }

    fn joint_input(&self, states: ArrayView2<f32>, actions: ArrayView2<f32>) -> Result<Array2<f32>> {
        if states.ncols() != self.state_size || actions.ncols() != self.action_size || states.nrows() != actions.nrows() {
            return Err(DdpgError::dimension_mismatch(
                format!("states [B, {}] and actions [B, {}]", self.state_size, self.action_size),
                format!("states {:?} and actions {:?}", states.dim(), actions.dim()),
            ));
        }
        concatenate(Axis(1), &[states.view(), actions.view()])
            .map_err(|e| DdpgError::dimension_mismatch("concatenable batches".to_string(), e.to_string()))
    }

    /// Q-values for a batch, shape `[B, 1]`.
    pub fn predict(&self, states: ArrayView2<f32>, actions: ArrayView2<f32>) -> Result<Array2<f32>> {
        let inputs = self.joint_input(states, actions)?;
        self.network.predict_batch(inputs.view())
    }

    pub fn predict_one(&self, state: ArrayView1<f32>, action: ArrayView1<f32>) -> Result<f32> {
        let q = self.predict(state.insert_axis(Axis(0)), action.insert_axis(Axis(0)))?;
        Ok(q[[0, 0]])
    }

    /// One MSE regression step towards `q_targets` (`[B, 1]`). Returns the
    /// loss before the update.
    pub fn train_on_batch(
        &mut self,
        states: ArrayView2<f32>,
        actions: ArrayView2<f32>,
        q_targets: ArrayView2<f32>,
        learning_rate: f32,
    ) -> Result<f32> {
        let inputs = self.joint_input(states, actions)?;
        self.network.train_minibatch(inputs.view(), q_targets, &MSE, learning_rate)
    }

    /// `dQ/da` for every row of the batch, shape `[B, action_size]`.
    ///
    /// Parameters are left untouched; only the forward cache is refreshed.
    pub fn action_gradients(&mut self, states: ArrayView2<f32>, actions: ArrayView2<f32>) -> Result<Array2<f32>> {
        let inputs = self.joint_input(states, actions)?;
        let outputs = self.network.forward_batch(inputs.view())?;
        let gradients = self.network.backward_batch(Array2::ones(outputs.dim()).view())?;
        Ok(gradients.input_error.slice(s![.., self.state_size..]).to_owned())
    }

    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut NeuralNetwork {
        &mut self.network
    }
}
