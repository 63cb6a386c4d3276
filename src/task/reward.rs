/// Scores one simulation step.
///
/// Reward shaping is a tunable policy: the task only requires that reward
/// grows as the quadcopter approaches the target while keeping some velocity.
pub trait RewardShaping {
    fn reward(&self, pose: &[f32; 6], velocity: &[f32; 3], target: &[f32; 3]) -> f32;
}

/// Distance penalty through a bounded transform, a small velocity bonus and a
/// per-axis proximity bonus.
///
/// `r = -a * tanh(0.01 * gap) + b * |v| + c * sum_i tanh(1 / (eps + |p_i - t_i|))`
/// with `gap = 0.01 * |p - t|`. Every distance enters through `tanh`, and
/// `eps` keeps the proximity term finite at the target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverReward {
    pub distance_weight: f32,
    pub velocity_weight: f32,
    pub proximity_weight: f32,
    pub epsilon: f32,
}

impl Default for HoverReward {
    fn default() -> Self {
        HoverReward {
            distance_weight: 10.0,
            velocity_weight: 0.001,
            proximity_weight: 1000.0,
            epsilon: 1e-5,
        }
    }
}

impl RewardShaping for HoverReward {
    fn reward(&self, pose: &[f32; 6], velocity: &[f32; 3], target: &[f32; 3]) -> f32 {
        let offsets: Vec<f32> = pose[..3].iter().zip(target).map(|(p, t)| (p - t).abs()).collect();

        let gap = 0.01 * offsets.iter().map(|d| d * d).sum::<f32>().sqrt();
        let speed = velocity.iter().map(|v| v * v).sum::<f32>().sqrt();
        let proximity: f32 = offsets.iter().map(|d| (1.0 / (self.epsilon + d)).tanh()).sum();

        -self.distance_weight * (0.01 * gap).tanh() + self.velocity_weight * speed + self.proximity_weight * proximity
    }
}
