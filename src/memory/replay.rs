use rand::{seq::SliceRandom, Rng};

use crate::{ds::RingBuffer, error::AgentError};

use super::Transition;

/// A fixed-size memory storage for reinforcement learning experiences
///
/// This structure uses a ring buffer to store [transitions](Transition).
/// It automatically overwrites the oldest transition once it reaches its capacity.
#[derive(Debug, Clone)]
pub struct ReplayMemory {
    memory: RingBuffer<Transition>,
}

impl ReplayMemory {
    /// **Panics** if `capacity` is zero
    pub fn new(capacity: usize) -> Self {
        Self {
            memory: RingBuffer::new(capacity),
        }
    }

    /// Add a new transition to the memory, evicting the oldest one if full
    pub fn record(&mut self, transition: Transition) {
        self.memory.push(transition);
    }

    /// Sample `batch_size` distinct transitions uniformly at random
    ///
    /// ### Returns
    /// - `Ok(transitions)` if `batch_size` is less than or equal to the number of stored transitions
    /// - `Err(AgentError::InsufficientData)` otherwise
    pub fn sample<R: Rng + ?Sized>(
        &self,
        batch_size: usize,
        rng: &mut R,
    ) -> Result<Vec<&Transition>, AgentError> {
        if batch_size > self.memory.len() {
            return Err(AgentError::InsufficientData {
                requested: batch_size,
                available: self.memory.len(),
            });
        }

        Ok(self
            .memory
            .view()
            .choose_multiple(rng, batch_size)
            .collect())
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.memory.capacity()
    }

    /// Iterate over the stored transitions from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.memory.iter()
    }
}

impl Default for ReplayMemory {
    fn default() -> Self {
        Self::new(2000)
    }
}
