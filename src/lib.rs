//! # quadcopter-ddpg - learning to hover with Deep Deterministic Policy Gradient
//!
//! An actor-critic agent that learns rotor speeds for a simulated quadcopter
//! so it reaches and holds a target position.
//!
//! ## Key Features
//!
//! - **DDPG**: local/target actor and critic networks with soft target updates
//! - **Experience Replay**: fixed-capacity FIFO buffer with uniform sampling
//! - **Exploration**: Ornstein-Uhlenbeck noise with a seedable random source
//! - **Networks**: dense feed-forward networks on `ndarray` with explicit
//!   backpropagation, including gradients with respect to the input
//! - **Task**: reward shaping and state stacking over any [`task::Simulation`]
//!
//! ## Module Organization
//!
//! - [`activations`] - Activation functions (ReLU, Sigmoid, Tanh, Linear)
//! - [`algorithms`] - Actor, Critic and the DDPG agent
//! - [`config`] - Agent hyperparameters
//! - [`error`] - Error types and result handling
//! - [`layers`] - Dense layers and weight initialisation
//! - [`loss`] - Loss functions for training
//! - [`network`] - Feed-forward network and soft update
//! - [`noise`] - Ornstein-Uhlenbeck exploration noise
//! - [`optimizer`] - SGD and Adam
//! - [`replay_buffer`] - Experience replay
//! - [`task`] - Environment contract and the quadcopter task

pub mod activations;
pub mod algorithms;
pub mod config;
pub mod error;
pub mod layers;
pub mod loss;
pub mod network;
pub mod noise;
pub mod optimizer;
pub mod replay_buffer;
pub mod task;

#[cfg(test)]
mod tests;
