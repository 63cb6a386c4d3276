use ndarray::{stack, Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, trace, warn};

use crate::config::DdpgConfig;
use crate::error::{DdpgError, Result};
use crate::network::soft_update;
use crate::noise::OUNoise;
use crate::replay_buffer::{ReplayBuffer, Transition};
use crate::task::Environment;
use super::actor::Actor;
use super::critic::Critic;

/// Summary of one learning update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LearnStats {
    /// Critic MSE before its update
    pub critic_loss: f32,
    /// Mean bootstrapped regression target
    pub mean_q_target: f32,
}

/// The four networks of an agent, as written by [`DdpgAgent::save`].
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NetworkCheckpoint {
    pub actor_local: Actor,
    pub actor_target: Actor,
    pub critic_local: Critic,
    pub critic_target: Critic,
}

/// Deep Deterministic Policy Gradient agent bound to one task.
///
/// Holds local and target copies of the actor and critic. Local networks
/// are trained by gradient steps on replayed transitions; target networks
/// only follow them through soft updates and supply the bootstrapped
/// next-state values.
pub struct DdpgAgent<E: Environment> {
    task: E,
    pub actor_local: Actor,
    pub actor_target: Actor,
    pub critic_local: Critic,
    pub critic_target: Critic,
    noise: OUNoise,
    memory: ReplayBuffer,
    config: DdpgConfig,
    last_state: Option<Array1<f32>>,
    rng: StdRng,
    learn_steps: usize,
}

impl<E: Environment> DdpgAgent<E> {
    /// Build an agent sized from the task's state and action spaces.
    /// Target networks start as exact copies of the local ones.
    pub fn new(task: E, config: DdpgConfig) -> Result<Self> {
        config.validate()?;

        let state_size = task.state_size();
        let action_size = task.action_size();
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let actor_local = Actor::new(
            state_size,
            action_size,
            &config.actor_hidden,
            task.action_low(),
            task.action_high(),
            config.optimizer.build(),
            &mut rng,
        )?;
        let critic_local = Critic::new(
            state_size,
            action_size,
            &config.critic_hidden,
            config.optimizer.build(),
            &mut rng,
        )?;
        let actor_target = actor_local.clone();
        let critic_target = critic_local.clone();

        let noise = OUNoise::new(
            action_size,
            config.exploration_mu,
            config.exploration_theta,
            config.exploration_sigma,
            StdRng::seed_from_u64(rng.gen()),
        );
        let memory = ReplayBuffer::new(config.buffer_size);

        info!(
            state_size,
            action_size,
            actor_params = actor_local.network().parameter_count(),
            critic_params = critic_local.network().parameter_count(),
            buffer_size = config.buffer_size,
            batch_size = config.batch_size,
            gamma = config.gamma,
            tau = config.tau,
            "DDPG agent initialised"
        );

        Ok(DdpgAgent {
            task,
            actor_local,
            actor_target,
            critic_local,
            critic_target,
            noise,
            memory,
            config,
            last_state: None,
            rng,
            learn_steps: 0,
        })
    }

    /// Start an episode: reset the noise process and the task, remember the
    /// initial state and return it.
    pub fn reset_episode(&mut self) -> Array1<f32> {
        self.noise.reset();
        let state = self.task.reset();
        self.last_state = Some(state.clone());
        state
    }

    /// Policy action plus one exploration noise sample. The result is not
    /// clipped to the action bounds.
    pub fn act(&mut self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        let action = self.actor_local.predict(state)?;
        Ok(action + self.noise.sample())
    }

    /// Policy action without exploration noise.
    pub fn act_deterministic(&self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        self.actor_local.predict(state)
    }

    /// Record `(last_state, action, reward, next_state, done)` and learn from
    /// one sampled batch once the buffer holds more than `batch_size`
    /// transitions. Returns the learning statistics when an update ran.
    pub fn step(
        &mut self,
        action: ArrayView1<f32>,
        reward: f32,
        next_state: Array1<f32>,
        done: bool,
    ) -> Result<Option<LearnStats>> {
        let state = self
            .last_state
            .clone()
            .ok_or_else(|| DdpgError::EpisodeNotStarted("reset_episode() must be called before step()".to_string()))?;
        self.check_width("action", action.len(), self.task.action_size())?;
        self.check_width("next_state", next_state.len(), self.task.state_size())?;

        self.memory.add(state, action.to_owned(), reward, next_state.clone(), done);
        trace!(reward, done, buffered = self.memory.len(), "stored transition");

        let stats = if self.memory.len() > self.config.batch_size {
            let experiences = self
                .memory
                .sample(self.config.batch_size, &mut self.rng)?
                .into_iter()
                .cloned()
                .collect::<Vec<_>>();
            Some(self.learn(&experiences)?)
        } else {
            None
        };

        self.last_state = Some(next_state);
        Ok(stats)
    }

    /// One DDPG update from a batch of transitions: critic regression towards
    /// the bootstrapped targets, actor ascent along the critic's action
    /// gradients, then soft updates of both target networks.
    pub fn learn(&mut self, experiences: &[Transition]) -> Result<LearnStats> {
        if experiences.is_empty() {
            return Err(DdpgError::Training("cannot learn from an empty batch".to_string()));
        }

        let states = stack_rows(experiences.iter().map(|e| e.state.view()))?;
        let actions = stack_rows(experiences.iter().map(|e| e.action.view()))?;
        let next_states = stack_rows(experiences.iter().map(|e| e.next_state.view()))?;
        let rewards = Array2::from_shape_fn((experiences.len(), 1), |(i, _)| experiences[i].reward);
        let dones = Array2::from_shape_fn((experiences.len(), 1), |(i, _)| {
            if experiences[i].done { 1.0 } else { 0.0 }
        });

        let actions_next = self.actor_target.predict_batch(next_states.view())?;
        let q_targets_next = self.critic_target.predict(next_states.view(), actions_next.view())?;
        let q_targets = bootstrap_targets(rewards.view(), q_targets_next.view(), dones.view(), self.config.gamma)?;

        let critic_loss = self.critic_local.train_on_batch(
            states.view(),
            actions.view(),
            q_targets.view(),
            self.config.critic_learning_rate,
        )?;
        if !critic_loss.is_finite() {
            warn!(critic_loss, step = self.learn_steps, "non-finite critic loss");
        }

        let action_gradients = self.critic_local.action_gradients(states.view(), actions.view())?;
        self.actor_local
            .train(states.view(), action_gradients.view(), self.config.actor_learning_rate)?;

        self.soft_update_targets()?;
        self.learn_steps += 1;

        let stats = LearnStats {
            critic_loss,
            mean_q_target: q_targets.mean().unwrap_or(0.0),
        };
        debug!(
            step = self.learn_steps,
            critic_loss = stats.critic_loss,
            mean_q_target = stats.mean_q_target,
            "learning step"
        );
        Ok(stats)
    }

    fn soft_update_targets(&mut self) -> Result<()> {
        let tau = self.config.tau;
        soft_update(self.critic_local.network(), self.critic_target.network_mut(), tau)?;
        soft_update(self.actor_local.network(), self.actor_target.network_mut(), tau)
    }

    fn check_width(&self, name: &str, actual: usize, expected: usize) -> Result<()> {
        if actual != expected {
            return Err(DdpgError::dimension_mismatch(
                format!("{} of length {}", name, expected),
                format!("{} of length {}", name, actual),
            ));
        }
        Ok(())
    }

    /// Write all four networks to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let checkpoint = NetworkCheckpoint {
            actor_local: self.actor_local.clone(),
            actor_target: self.actor_target.clone(),
            critic_local: self.critic_local.clone(),
            critic_target: self.critic_target.clone(),
        };
        fs::write(path.as_ref(), bincode::serialize(&checkpoint)?)?;
        info!(path = %path.as_ref().display(), learn_steps = self.learn_steps, "saved DDPG networks");
        Ok(())
    }

    /// Replace all four networks with the ones stored at `path`. The stored
    /// networks must match this agent's state and action sizes.
    pub fn load_networks<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let checkpoint: NetworkCheckpoint = bincode::deserialize(&fs::read(path.as_ref())?)?;

        let (state_size, action_size) = (self.task.state_size(), self.task.action_size());
        let fits = [
            (checkpoint.actor_local.state_size, checkpoint.actor_local.action_size),
            (checkpoint.actor_target.state_size, checkpoint.actor_target.action_size),
            (checkpoint.critic_local.state_size, checkpoint.critic_local.action_size),
            (checkpoint.critic_target.state_size, checkpoint.critic_target.action_size),
        ]
        .iter()
        .all(|&dims| dims == (state_size, action_size));
        if !fits {
            return Err(DdpgError::dimension_mismatch(
                format!("networks for state {} / action {}", state_size, action_size),
                format!(
                    "networks for state {} / action {}",
                    checkpoint.actor_local.state_size, checkpoint.actor_local.action_size
                ),
            ));
        }

        self.actor_local = checkpoint.actor_local;
        self.actor_target = checkpoint.actor_target;
        self.critic_local = checkpoint.critic_local;
        self.critic_target = checkpoint.critic_target;
        info!(path = %path.as_ref().display(), "loaded DDPG networks");
        Ok(())
    }

    pub fn task(&self) -> &E {
        &self.task
    }

    pub fn task_mut(&mut self) -> &mut E {
        &mut self.task
    }

    pub fn config(&self) -> &DdpgConfig {
        &self.config
    }

    pub fn memory(&self) -> &ReplayBuffer {
        &self.memory
    }

    pub fn noise(&self) -> &OUNoise {
        &self.noise
    }

    pub fn last_state(&self) -> Option<&Array1<f32>> {
        self.last_state.as_ref()
    }

    /// Number of learning updates performed so far.
    pub fn learn_steps(&self) -> usize {
        self.learn_steps
    }
}

/// TD(0) regression targets `r + gamma * q_next * (1 - done)`.
///
/// Terminal rows get exactly `r`, whatever `q_next` holds. All three inputs
/// must share one shape.
pub fn bootstrap_targets(
    rewards: ArrayView2<f32>,
    q_targets_next: ArrayView2<f32>,
    dones: ArrayView2<f32>,
    gamma: f32,
) -> Result<Array2<f32>> {
    for other in [q_targets_next.dim(), dones.dim()] {
        if other != rewards.dim() {
            return Err(DdpgError::dimension_mismatch(
                format!("{:?}", rewards.dim()),
                format!("{:?}", other),
            ));
        }
    }

    let mut targets = rewards.to_owned();
    Zip::from(&mut targets)
        .and(q_targets_next)
        .and(dones)
        .for_each(|target, &q_next, &done| {
            if done == 0.0 {
                *target += gamma * q_next;
            }
        });
    Ok(targets)
}

/// Stack 1D arrays into 2D array
fn stack_rows<'a, I>(rows: I) -> Result<Array2<f32>>
where
    I: Iterator<Item = ArrayView1<'a, f32>>,
{
    let rows = rows.collect::<Vec<_>>();
    stack(Axis(0), &rows).map_err(|e| DdpgError::dimension_mismatch("rows of equal length".to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_terminal_rows_get_reward_only() {
        let rewards = array![[1.5], [-2.0]];
        let q_next = array![[f32::INFINITY], [10.0]];
        let dones = array![[1.0], [0.0]];
        let targets = bootstrap_targets(rewards.view(), q_next.view(), dones.view(), 0.99).unwrap();
        assert_eq!(targets[[0, 0]], 1.5);
        assert!((targets[[1, 0]] - 7.9).abs() < 1e-5);
    }

    #[test]
    fn test_bootstrap_rejects_mismatched_shapes() {
        let rewards = Array2::zeros((4, 1));
        let short = Array2::zeros((3, 1));
        let result = bootstrap_targets(rewards.view(), short.view(), rewards.view(), 0.99);
        assert!(matches!(result, Err(DdpgError::DimensionMismatch { .. })));

        let result = bootstrap_targets(rewards.view(), rewards.view(), short.view(), 0.99);
        assert!(matches!(result, Err(DdpgError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_stack_rows_rejects_ragged_batch() {
        let a = array![1.0, 2.0];
        let b = array![1.0];
        assert!(stack_rows(vec![a.view(), b.view()].into_iter()).is_err());
    }
}
