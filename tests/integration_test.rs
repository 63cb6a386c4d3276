use ndarray::Array1;
use quadcopter_ddpg::{
    algorithms::DdpgAgent,
    config::DdpgConfig,
    error::Result,
    network::NeuralNetwork,
    task::{Environment, QuadcopterTask, QuadcopterTaskConfig, Simulation},
};

/// Fixed-reward environment shaped like the quadcopter task: 18 state
/// values, 4 rotor speeds in `[0, 900]`, episode over after `episode_len`
/// steps.
struct FixedRewardTask {
    steps: usize,
    episode_len: usize,
}

impl FixedRewardTask {
    fn state(&self) -> Array1<f32> {
        Array1::from_shape_fn(18, |i| ((self.steps * 18 + i) as f32 * 0.05).cos())
    }
}

impl Environment for FixedRewardTask {
    fn reset(&mut self) -> Array1<f32> {
        self.steps = 0;
        self.state()
    }

    fn step(&mut self, _action: &[f32]) -> Result<(Array1<f32>, f32, bool)> {
        self.steps += 1;
        Ok((self.state(), 1.0, self.steps >= self.episode_len))
    }

    fn state_size(&self) -> usize {
        18
    }

    fn action_size(&self) -> usize {
        4
    }

    fn action_low(&self) -> f32 {
        0.0
    }

    fn action_high(&self) -> f32 {
        900.0
    }
}

/// Vertical-only flight: thrust above the hover speed lifts, below it sinks.
struct VerticalSim {
    z: f32,
    vz: f32,
    steps: usize,
    runtime: usize,
}

impl VerticalSim {
    fn new(runtime: usize) -> Self {
        VerticalSim { z: 0.0, vz: 0.0, steps: 0, runtime }
    }
}

impl Simulation for VerticalSim {
    fn reset(&mut self) {
        self.z = 0.0;
        self.vz = 0.0;
        self.steps = 0;
    }

    fn next_timestep(&mut self, rotor_speeds: &[f32]) -> bool {
        let mean = rotor_speeds.iter().sum::<f32>() / rotor_speeds.len() as f32;
        self.vz += (mean - 450.0) * 1e-3;
        self.z = (self.z + self.vz * 0.02).max(0.0);
        self.steps += 1;
        self.steps >= self.runtime
    }

    fn pose(&self) -> [f32; 6] {
        [0.0, 0.0, self.z, 0.0, 0.0, 0.0]
    }

    fn velocity(&self) -> [f32; 3] {
        [0.0, 0.0, self.vz]
    }
}

fn flatten(network: &NeuralNetwork) -> Vec<f32> {
    network
        .layers
        .iter()
        .flat_map(|l| l.weights.iter().chain(l.biases.iter()).copied().collect::<Vec<_>>())
        .collect()
}

fn run_episode<E: Environment>(agent: &mut DdpgAgent<E>) -> Result<(usize, f32)> {
    let mut state = agent.reset_episode();
    let mut steps = 0;
    let mut total_reward = 0.0;
    loop {
        let action = agent.act(state.view())?;
        let rotor_speeds = action.to_vec();
        let (next_state, reward, done) = agent.task_mut().step(&rotor_speeds)?;
        agent.step(action.view(), reward, next_state.clone(), done)?;
        steps += 1;
        total_reward += reward;
        state = next_state;
        if done {
            return Ok((steps, total_reward));
        }
    }
}

#[test]
fn test_first_episode_learning_schedule() {
    let config = DdpgConfig::builder()
        .buffer_size(100_000)
        .batch_size(32)
        .gamma(0.99)
        .tau(0.001)
        .seed(42)
        .build()
        .unwrap();
    let task = FixedRewardTask { steps: 0, episode_len: 40 };
    let mut agent = DdpgAgent::new(task, config).unwrap();

    let initial_actor_target = flatten(agent.actor_target.network());
    let initial_critic_target = flatten(agent.critic_target.network());

    let mut state = agent.reset_episode();
    for step in 1..=40 {
        let action = agent.act(state.view()).unwrap();
        assert_eq!(action.len(), 4);
        let (next_state, reward, done) = agent.task_mut().step(action.as_slice().unwrap()).unwrap();
        assert_eq!(reward, 1.0);
        assert_eq!(done, step == 40);

        let stats = agent.step(action.view(), reward, next_state.clone(), done).unwrap();
        if step <= 32 {
            assert!(stats.is_none());
            assert_eq!(agent.learn_steps(), 0);
        } else {
            let stats = stats.unwrap();
            assert!(stats.critic_loss.is_finite());
            assert!(stats.mean_q_target.is_finite());
            assert_eq!(agent.learn_steps(), step - 32);
        }
        state = next_state;
    }

    assert_eq!(agent.learn_steps(), 8);
    assert_eq!(agent.memory().len(), 40);

    // tau = 0.001 over eight updates leaves the targets close to where they started
    for (before, after) in [
        (initial_actor_target, flatten(agent.actor_target.network())),
        (initial_critic_target, flatten(agent.critic_target.network())),
    ] {
        assert_ne!(before, after);
        let drift = before
            .iter()
            .zip(&after)
            .map(|(b, a)| (b - a).abs())
            .fold(0.0f32, f32::max);
        assert!(drift < 1e-2, "target drift {}", drift);
    }
}

#[test]
fn test_actions_stay_near_rotor_range() {
    let config = DdpgConfig::builder().seed(3).build().unwrap();
    let mut agent = DdpgAgent::new(FixedRewardTask { steps: 0, episode_len: 5 }, config).unwrap();
    let state = agent.reset_episode();

    let greedy = agent.act_deterministic(state.view()).unwrap();
    assert!(greedy.iter().all(|&a| (0.0..=900.0).contains(&a)));

    // Noise is added after the rescale and may step slightly outside.
    let noisy = agent.act(state.view()).unwrap();
    assert!(noisy.iter().all(|&a| (-10.0..=910.0).contains(&a)));
}

#[test]
fn test_quadcopter_training_episodes() {
    let task = QuadcopterTask::new(VerticalSim::new(45), QuadcopterTaskConfig::default()).unwrap();
    assert_eq!(task.state_size(), 18);

    let config = DdpgConfig::builder().seed(7).build().unwrap();
    let mut agent = DdpgAgent::new(task, config).unwrap();

    let mut total_steps = 0;
    for _ in 0..3 {
        let (steps, total_reward) = run_episode(&mut agent).unwrap();
        assert_eq!(steps, 15);
        assert!(total_reward.is_finite());
        total_steps += steps;
    }

    assert_eq!(agent.memory().len(), total_steps);
    assert_eq!(agent.learn_steps(), total_steps - 32);
    assert!(agent.last_state().unwrap().iter().all(|v| v.is_finite()));
}

#[test]
fn test_resume_from_saved_networks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hover.bin");

    let config = DdpgConfig::builder().seed(11).build().unwrap();
    let mut trained = DdpgAgent::new(FixedRewardTask { steps: 0, episode_len: 40 }, config.clone()).unwrap();
    run_episode(&mut trained).unwrap();
    trained.save(&path).unwrap();

    let mut resumed = DdpgAgent::new(
        FixedRewardTask { steps: 0, episode_len: 40 },
        DdpgConfig { seed: Some(12), ..config },
    )
    .unwrap();
    resumed.load_networks(&path).unwrap();

    let state = resumed.reset_episode();
    assert_eq!(
        trained.act_deterministic(state.view()).unwrap(),
        resumed.act_deterministic(state.view()).unwrap()
    );
}
