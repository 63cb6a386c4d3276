//! # Task Module
//!
//! The environment side of the learning loop. An [`Environment`] is what
//! the agent is bound to: it resets to an initial state and turns an action
//! into `(next_state, reward, done)`.
//!
//! [`QuadcopterTask`] is the environment for the hover problem. It wraps a
//! physics [`Simulation`], repeats each rotor command for a few simulation
//! steps, stacks the resulting poses into the state vector and scores every
//! step with a [`RewardShaping`] policy.

pub mod quadcopter;
pub mod reward;

use ndarray::Array1;

use crate::error::Result;

pub use quadcopter::{QuadcopterTask, QuadcopterTaskConfig};
pub use reward::{HoverReward, RewardShaping};

/// Environment contract consumed by the agent and by training drivers.
pub trait Environment {
    /// Start a new episode and return its initial state.
    fn reset(&mut self) -> Array1<f32>;

    /// Apply `action` and return `(next_state, reward, done)`.
    fn step(&mut self, action: &[f32]) -> Result<(Array1<f32>, f32, bool)>;

    fn state_size(&self) -> usize;

    fn action_size(&self) -> usize;

    fn action_low(&self) -> f32;

    fn action_high(&self) -> f32;
}

/// Opaque rigid-body simulator driven by four rotor speeds.
///
/// Integration details belong to the implementor; the task only reads the
/// pose and linear velocity after each timestep.
pub trait Simulation {
    /// Restore the initial conditions.
    fn reset(&mut self);

    /// Advance one timestep with the given rotor speeds. Returns `true` once
    /// the episode is over (time budget spent or bounds left).
    fn next_timestep(&mut self, rotor_speeds: &[f32]) -> bool;

    /// `[x, y, z, phi, theta, psi]`
    fn pose(&self) -> [f32; 6];

    /// Linear velocity `[vx, vy, vz]`
    fn velocity(&self) -> [f32; 3];
}
