use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::env::Environment;

/// A stand-in for a live game session
///
/// Every step produces a state vector and a reward drawn uniformly from `[0, 1)`, regardless of the action taken.
/// Each step ends the episode with probability `end_probability`, and episodes are truncated after `max_steps`.
#[derive(Debug, Clone)]
pub struct RandomArena {
    state_size: usize,
    action_size: usize,
    end_probability: f64,
    max_steps: usize,
    steps: usize,
    rng: StdRng,
}

impl RandomArena {
    /// **Panics** if `state_size` or `action_size` is zero
    pub fn new(state_size: usize, action_size: usize) -> Self {
        assert!(
            state_size > 0 && action_size > 0,
            "State and action sizes must be nonzero."
        );
        Self {
            state_size,
            action_size,
            end_probability: 0.05,
            max_steps: 500,
            steps: 0,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// **Panics** if `end_probability` is not in the interval `[0,1]`
    pub fn with_end_probability(mut self, end_probability: f64) -> Self {
        crate::assert_interval!(end_probability, 0.0, 1.0);
        self.end_probability = end_probability;
        self
    }

    fn observe(&mut self) -> Vec<f32> {
        (0..self.state_size).map(|_| self.rng.gen::<f32>()).collect()
    }
}

impl Environment for RandomArena {
    fn state_size(&self) -> usize {
        self.state_size
    }

    fn action_size(&self) -> usize {
        self.action_size
    }

    fn reset(&mut self) -> Vec<f32> {
        self.steps = 0;
        self.observe()
    }

    fn step(&mut self, action: usize) -> (Vec<f32>, f32, bool) {
        assert!(action < self.action_size, "Invalid action: {}", action);
        self.steps += 1;
        let next_state = self.observe();
        let reward = self.rng.gen::<f32>();
        let terminal = self.rng.gen_bool(self.end_probability) || self.steps >= self.max_steps;
        (next_state, reward, terminal)
    }
}
