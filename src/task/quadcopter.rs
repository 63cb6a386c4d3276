use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{DdpgError, Result};
use super::reward::{HoverReward, RewardShaping};
use super::{Environment, Simulation};

/// Number of rotors driven by one action
pub const ROTOR_COUNT: usize = 4;

/// Pose components stacked into the state per simulation step
pub const POSE_SIZE: usize = 6;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct QuadcopterTaskConfig {
    /// Simulation steps per agent action
    pub action_repeat: usize,
    /// Lowest rotor speed
    pub action_low: f32,
    /// Highest rotor speed
    pub action_high: f32,
    /// Goal position `(x, y, z)`
    pub target_pos: [f32; 3],
}

impl Default for QuadcopterTaskConfig {
    fn default() -> Self {
        QuadcopterTaskConfig {
            action_repeat: 3,
            action_low: 0.0,
            action_high: 900.0,
            target_pos: [0.0, 0.0, 10.0],
        }
    }
}

/// Reach-and-hold task: fly the quadcopter to `target_pos` and stay there.
///
/// The state is the pose after each of the `action_repeat` simulation steps
/// an action is held for, so `state_size = 6 * action_repeat`.
pub struct QuadcopterTask<S: Simulation, W: RewardShaping = HoverReward> {
    sim: S,
    shaping: W,
    config: QuadcopterTaskConfig,
}

impl<S: Simulation> QuadcopterTask<S, HoverReward> {
    pub fn new(sim: S, config: QuadcopterTaskConfig) -> Result<Self> {
        Self::with_reward(sim, config, HoverReward::default())
    }
}

impl<S: Simulation, W: RewardShaping> QuadcopterTask<S, W> {
    pub fn with_reward(sim: S, config: QuadcopterTaskConfig, shaping: W) -> Result<Self> {
        if config.action_repeat == 0 {
            return Err(DdpgError::invalid_parameter("action_repeat", "must be at least 1"));
        }
        if !(config.action_low < config.action_high) {
            return Err(DdpgError::invalid_parameter(
                "action_high".to_string(),
                format!("{} must exceed action_low {}", config.action_high, config.action_low),
            ));
        }
        Ok(QuadcopterTask { sim, shaping, config })
    }

    /// Reward for the simulator's current pose and velocity.
    pub fn reward(&self) -> f32 {
        self.shaping.reward(&self.sim.pose(), &self.sim.velocity(), &self.config.target_pos)
    }

    pub fn target_pos(&self) -> [f32; 3] {
        self.config.target_pos
    }

    pub fn config(&self) -> &QuadcopterTaskConfig {
        &self.config
    }

    pub fn sim(&self) -> &S {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut S {
        &mut self.sim
    }
}

impl<S: Simulation, W: RewardShaping> Environment for QuadcopterTask<S, W> {
    fn reset(&mut self) -> Array1<f32> {
        self.sim.reset();
        let pose = self.sim.pose();
        Array1::from_iter((0..self.config.action_repeat).flat_map(|_| pose))
    }

    fn step(&mut self, rotor_speeds: &[f32]) -> Result<(Array1<f32>, f32, bool)> {
        if rotor_speeds.len() != ROTOR_COUNT {
            return Err(DdpgError::dimension_mismatch(
                format!("{} rotor speeds", ROTOR_COUNT),
                format!("{} rotor speeds", rotor_speeds.len()),
            ));
        }

        let mut reward = 0.0;
        let mut done = false;
        let mut poses = Vec::with_capacity(self.state_size());
        for _ in 0..self.config.action_repeat {
            done = self.sim.next_timestep(rotor_speeds);
            reward += self.reward();
            poses.extend_from_slice(&self.sim.pose());
        }
        trace!(reward, done, "quadcopter step");

        Ok((Array1::from(poses), reward, done))
    }

    fn state_size(&self) -> usize {
        self.config.action_repeat * POSE_SIZE
    }

    fn action_size(&self) -> usize {
        ROTOR_COUNT
    }

    fn action_low(&self) -> f32 {
        self.config.action_low
    }

    fn action_high(&self) -> f32 {
        self.config.action_high
    }
}
