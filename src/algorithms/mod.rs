//! # Actor-Critic Algorithms Module
//!
//! Deep Deterministic Policy Gradient (DDPG) for continuous control.
//!
//! ## Pieces
//!
//! - [`Actor`] - deterministic policy `state -> action`, bounded to the
//!   task's action range by a Sigmoid output and an affine rescale
//! - [`Critic`] - `Q(state, action)` estimate, trained by regression on
//!   bootstrapped targets; also exposes `dQ/da` for the actor's update
//! - [`DdpgAgent`] - owns local and target copies of both networks, the
//!   replay buffer and the exploration noise, and runs the learning update
//!
//! ## Learning update
//!
//! For a sampled batch of transitions:
//!
//! 1. `a' = actor_target(s')`, `q' = critic_target(s', a')`
//! 2. `y = r + gamma * q' * (1 - done)`
//! 3. one MSE step of `critic_local` towards `y`
//! 4. one ascent step of `actor_local` along `critic_local`'s `dQ/da`
//! 5. `target <- tau * local + (1 - tau) * target` for both networks
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use quadcopter_ddpg::algorithms::DdpgAgent;
//! use quadcopter_ddpg::config::DdpgConfig;
//! use quadcopter_ddpg::task::{Environment, QuadcopterTask, QuadcopterTaskConfig, Simulation};
//!
//! fn train<S: Simulation>(sim: S, episodes: usize) -> quadcopter_ddpg::error::Result<()> {
//!     let task = QuadcopterTask::new(sim, QuadcopterTaskConfig::default())?;
//!     let mut agent = DdpgAgent::new(task, DdpgConfig::default())?;
//!
//!     for _ in 0..episodes {
//!         let mut state = agent.reset_episode();
//!         loop {
//!             let action = agent.act(state.view())?;
//!             let (next_state, reward, done) = agent.task_mut().step(action.as_slice().unwrap())?;
//!             agent.step(action.view(), reward, next_state.clone(), done)?;
//!             state = next_state;
//!             if done {
//!                 break;
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod actor;
pub mod critic;
pub mod ddpg;

pub use actor::Actor;
pub use critic::Critic;
pub use ddpg::{bootstrap_targets, DdpgAgent, LearnStats, NetworkCheckpoint};
pub use crate::network::soft_update;
