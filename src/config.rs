//! Hyperparameters of the DDPG agent.
//!
//! A [`DdpgConfig`] is fixed for the agent's lifetime. It can be built in
//! code with [`DdpgConfigBuilder`] or read from JSON:
//!
//! ```rust
//! use quadcopter_ddpg::config::DdpgConfig;
//!
//! let config = DdpgConfig::from_json_str(r#"{ "batch_size": 64, "tau": 0.005 }"#).unwrap();
//! assert_eq!(config.batch_size, 64);
//! assert_eq!(config.buffer_size, 100_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{DdpgError, Result};
use crate::optimizer::{Adam, OptimizerWrapper, SGD};

/// Which optimizer trains the local networks.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizerKind {
    Sgd,
    Adam { beta1: f32, beta2: f32, epsilon: f32 },
}

impl Default for OptimizerKind {
    fn default() -> Self {
        OptimizerKind::Adam { beta1: 0.9, beta2: 0.999, epsilon: 1e-8 }
    }
}

impl OptimizerKind {
    pub fn build(&self) -> OptimizerWrapper {
        match *self {
            OptimizerKind::Sgd => OptimizerWrapper::SGD(SGD::new()),
            OptimizerKind::Adam { beta1, beta2, epsilon } => OptimizerWrapper::Adam(Adam::new(beta1, beta2, epsilon)),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DdpgConfig {
    /// Replay buffer capacity
    pub buffer_size: usize,
    /// Transitions per learning step
    pub batch_size: usize,
    /// Discount factor
    pub gamma: f32,
    /// Soft update coefficient
    pub tau: f32,
    /// Ornstein-Uhlenbeck mean
    pub exploration_mu: f32,
    /// Ornstein-Uhlenbeck mean reversion rate
    pub exploration_theta: f32,
    /// Ornstein-Uhlenbeck volatility
    pub exploration_sigma: f32,
    pub actor_learning_rate: f32,
    pub critic_learning_rate: f32,
    pub actor_hidden: Vec<usize>,
    pub critic_hidden: Vec<usize>,
    pub optimizer: OptimizerKind,
    /// Seeds network initialisation, noise and sampling when set
    pub seed: Option<u64>,
}

impl Default for DdpgConfig {
    fn default() -> Self {
        DdpgConfig {
            buffer_size: 100_000,
            batch_size: 32,
            gamma: 0.99,
            tau: 0.001,
            exploration_mu: 0.0,
            exploration_theta: 0.35,
            exploration_sigma: 0.1,
            actor_learning_rate: 1e-4,
            critic_learning_rate: 1e-3,
            actor_hidden: vec![32, 64, 32],
            critic_hidden: vec![32, 64],
            optimizer: OptimizerKind::default(),
            seed: None,
        }
    }
}

impl DdpgConfig {
    pub fn builder() -> DdpgConfigBuilder {
        DdpgConfigBuilder::new()
    }

    /// Check every value is usable before an agent is built.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(DdpgError::invalid_parameter("buffer_size", "must be greater than 0"));
        }
        if self.batch_size == 0 {
            return Err(DdpgError::invalid_parameter("batch_size", "must be greater than 0"));
        }
        if self.batch_size >= self.buffer_size {
            return Err(DdpgError::invalid_parameter(
                "batch_size".to_string(),
                format!("{} must be smaller than buffer_size {}", self.batch_size, self.buffer_size),
            ));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(DdpgError::invalid_parameter("gamma".to_string(), format!("{} is outside [0, 1]", self.gamma)));
        }
        if !(self.tau > 0.0 && self.tau <= 1.0) {
            return Err(DdpgError::invalid_parameter("tau".to_string(), format!("{} is outside (0, 1]", self.tau)));
        }
        if !(self.exploration_sigma >= 0.0) || !self.exploration_theta.is_finite() || !self.exploration_mu.is_finite() {
            return Err(DdpgError::invalid_parameter(
                "exploration".to_string(),
                format!(
                    "mu {}, theta {}, sigma {} do not describe an OU process",
                    self.exploration_mu, self.exploration_theta, self.exploration_sigma
                ),
            ));
        }
        for (name, rate) in [("actor_learning_rate", self.actor_learning_rate), ("critic_learning_rate", self.critic_learning_rate)] {
            if !(rate > 0.0 && rate.is_finite()) {
                return Err(DdpgError::invalid_parameter(name.to_string(), format!("{} must be positive", rate)));
            }
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: DdpgConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for DdpgConfig
pub struct DdpgConfigBuilder {
    config: DdpgConfig,
}

impl DdpgConfigBuilder {
    pub fn new() -> Self {
        DdpgConfigBuilder { config: DdpgConfig::default() }
    }

    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.config.buffer_size = buffer_size;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    pub fn gamma(mut self, gamma: f32) -> Self {
        self.config.gamma = gamma;
        self
    }

    pub fn tau(mut self, tau: f32) -> Self {
        self.config.tau = tau;
        self
    }

    pub fn noise_params(mut self, mu: f32, theta: f32, sigma: f32) -> Self {
        self.config.exploration_mu = mu;
        self.config.exploration_theta = theta;
        self.config.exploration_sigma = sigma;
        self
    }

    pub fn learning_rates(mut self, actor: f32, critic: f32) -> Self {
        self.config.actor_learning_rate = actor;
        self.config.critic_learning_rate = critic;
        self
    }

    pub fn actor_hidden(mut self, sizes: Vec<usize>) -> Self {
        self.config.actor_hidden = sizes;
        self
    }

    pub fn critic_hidden(mut self, sizes: Vec<usize>) -> Self {
        self.config.critic_hidden = sizes;
        self
    }

    pub fn optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.config.optimizer = optimizer;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<DdpgConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for DdpgConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DdpgConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.exploration_theta, 0.35);
        assert_eq!(config.exploration_sigma, 0.1);
    }

    #[test]
    fn test_builder_rejects_bad_tau() {
        assert!(DdpgConfig::builder().tau(0.0).build().is_err());
        assert!(DdpgConfig::builder().tau(1.5).build().is_err());
        assert!(DdpgConfig::builder().tau(1.0).build().is_ok());
    }

    #[test]
    fn test_builder_rejects_batch_not_smaller_than_buffer() {
        assert!(DdpgConfig::builder().buffer_size(32).batch_size(32).build().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = DdpgConfig::builder().gamma(0.9).seed(3).optimizer(OptimizerKind::Sgd).build().unwrap();
        let json = config.to_json_string().unwrap();
        assert_eq!(DdpgConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_json_validation_error() {
        assert!(matches!(
            DdpgConfig::from_json_str(r#"{ "gamma": 2.0 }"#),
            Err(DdpgError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ddpg.json");
        std::fs::write(&path, r#"{ "buffer_size": 500, "batch_size": 16 }"#).unwrap();
        let config = DdpgConfig::from_json_file(&path).unwrap();
        assert_eq!(config.buffer_size, 500);
        assert_eq!(config.batch_size, 16);
    }
}
