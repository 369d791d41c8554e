use rand::Rng;

use crate::decay::{self, Decay};

use super::Choice;

/// Epsilon greedy exploration policy with time-decaying epsilon threshold
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay> {
    epsilon: D,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    pub fn new(decay: D) -> Self {
        Self { epsilon: decay }
    }

    /// The exploration rate after `t` decay steps
    pub fn epsilon(&self, t: u32) -> f32 {
        self.epsilon.evaluate(t as f32)
    }

    /// Invoke epsilon greedy policy after `t` decay steps
    ///
    /// Explores when a uniform draw from `[0, 1)` falls below epsilon, so an epsilon of 0 always exploits
    /// and an epsilon of 1 always explores.
    pub fn choose<R: Rng + ?Sized>(&self, t: u32, rng: &mut R) -> Choice {
        if rng.gen::<f32>() < self.epsilon(t) {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }
}

impl Default for EpsilonGreedy<decay::Multiplicative> {
    fn default() -> Self {
        Self::new(decay::Multiplicative::default())
    }
}
