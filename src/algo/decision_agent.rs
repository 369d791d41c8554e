use burn::tensor::backend::Backend;
use log::{debug, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    assert_interval,
    decay,
    env::Environment,
    error::AgentError,
    exploration::{Choice, EpsilonGreedy},
    memory::{ReplayMemory, Transition},
    nn::{Gradients, ScoringNetwork, ScoringNetworkConfig},
    util::argmax,
};

/// How the weight adjustments of a sampled batch are applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateMode {
    /// One update per sampled transition, in sampling order. Later targets in a batch are computed with the
    /// weights already adjusted by earlier ones.
    #[default]
    PerSample,
    /// Gradients are averaged over the batch and applied in a single update
    BatchMean,
}

/// Configuration for the [`DecisionAgent`]
#[derive(Debug, Clone)]
pub struct DecisionAgentConfig {
    /// Length of the state vectors the agent observes
    pub state_size: usize,
    /// Number of discrete actions
    pub action_size: usize,
    /// Width of both hidden layers of the scoring network
    pub hidden_size: usize,
    /// Maximum number of transitions held in replay memory
    pub capacity: usize,
    /// The discount factor
    pub discount: f32,
    /// The exploration policy, decayed once per training step
    pub exploration: EpsilonGreedy<decay::Multiplicative>,
    /// The step size of every weight update
    pub learning_rate: f32,
    /// Clamp weights to `[-c, c]` after every update
    pub weight_clip: Option<f32>,
    pub update_mode: UpdateMode,
    /// Seed for weight initialization, exploration and sampling. Drawn from entropy when `None`.
    pub seed: Option<u64>,
}

impl DecisionAgentConfig {
    pub fn new(state_size: usize, action_size: usize) -> Self {
        Self {
            state_size,
            action_size,
            hidden_size: 24,
            capacity: 2000,
            discount: 0.95,
            exploration: EpsilonGreedy::new(decay::Multiplicative::new(0.995, 1.0, 0.01)),
            learning_rate: 1e-3,
            weight_clip: Some(2.0),
            update_mode: UpdateMode::PerSample,
            seed: None,
        }
    }

    fn network_config(&self) -> ScoringNetworkConfig {
        ScoringNetworkConfig {
            state_size: self.state_size,
            hidden_size: self.hidden_size,
            action_size: self.action_size,
            weight_clip: self.weight_clip,
        }
    }
}

/// Summary of one episode run with [`DecisionAgent::go`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeReport {
    /// Number of environment steps taken
    pub steps: usize,
    pub total_reward: f32,
    /// Exploration rate at the end of the episode
    pub exploration_rate: f32,
    /// Mean absolute TD error over the training steps of the episode, if any ran
    pub mean_td_error: Option<f32>,
}

/// An experience replay agent choosing among discrete actions with a small scoring network
///
/// ### Generics
/// - `B`: A burn backend holding the network's weights
pub struct DecisionAgent<B: Backend> {
    network: ScoringNetwork<B>,
    memory: ReplayMemory,
    exploration: EpsilonGreedy<decay::Multiplicative>,
    rng: StdRng,
    state_size: usize,
    action_size: usize,
    discount: f32,
    learning_rate: f32,
    update_mode: UpdateMode,
    train_steps: u32,
}

impl<B: Backend> DecisionAgent<B> {
    /// Initialize a new `DecisionAgent` with a randomly initialized scoring network
    ///
    /// **Panics** if `discount` is not in the interval `[0,1]`, if `learning_rate` is not positive,
    /// or if `capacity`, `state_size`, `action_size` or `hidden_size` is zero
    pub fn new(config: DecisionAgentConfig, device: &B::Device) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let network = ScoringNetwork::new(&config.network_config(), &mut rng, device);
        Self::build(config, network, rng)
    }

    /// Initialize a new `DecisionAgent` around an existing scoring network
    ///
    /// The network keeps its own hidden layer, so `hidden_size` of the config is ignored; `weight_clip` replaces
    /// the network's clipping bound.
    /// Fails with [`AgentError::ShapeMismatch`] if the network's input or output size differs from the config.
    ///
    /// **Panics** under the same conditions as [`DecisionAgent::new`]
    pub fn with_network(
        config: DecisionAgentConfig,
        network: ScoringNetwork<B>,
    ) -> Result<Self, AgentError> {
        AgentError::check_len("network input", config.state_size, network.state_size())?;
        AgentError::check_len("network output", config.action_size, network.action_size())?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let network = network.with_weight_clip(config.weight_clip);
        Ok(Self::build(config, network, rng))
    }

    fn build(config: DecisionAgentConfig, network: ScoringNetwork<B>, rng: StdRng) -> Self {
        assert_interval!(config.discount, 0.0, 1.0);
        assert!(
            config.learning_rate > 0.0,
            "Learning rate must be positive."
        );
        assert!(config.capacity > 0, "Memory capacity must be nonzero.");

        Self {
            network,
            memory: ReplayMemory::new(config.capacity),
            exploration: config.exploration,
            rng,
            state_size: config.state_size,
            action_size: config.action_size,
            discount: config.discount,
            learning_rate: config.learning_rate,
            update_mode: config.update_mode,
            train_steps: 0,
        }
    }

    pub fn network(&self) -> &ScoringNetwork<B> {
        &self.network
    }

    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    /// Number of completed training steps, which is also the number of exploration decay steps
    pub fn train_steps(&self) -> u32 {
        self.train_steps
    }

    /// The current probability of choosing a random action
    pub fn exploration_rate(&self) -> f32 {
        self.exploration.epsilon(self.train_steps)
    }

    /// Store one step of experience in replay memory
    pub fn record(
        &mut self,
        state: Vec<f32>,
        action: usize,
        reward: f32,
        next_state: Vec<f32>,
        terminal: bool,
    ) -> Result<(), AgentError> {
        AgentError::check_len("state", self.state_size, state.len())?;
        AgentError::check_len("next state", self.state_size, next_state.len())?;
        if action >= self.action_size {
            return Err(AgentError::InvalidAction {
                action,
                action_size: self.action_size,
            });
        }

        self.memory
            .record(Transition::new(state, action, reward, next_state, terminal));
        Ok(())
    }

    /// Invoke the agent's scoring network along with the exploration strategy to choose an action for `state`
    ///
    /// Exploiting picks the highest scoring action, preferring the lowest index on ties.
    pub fn select_action(&mut self, state: &[f32]) -> Result<usize, AgentError> {
        // Malformed states are rejected even when exploring
        AgentError::check_len("state", self.state_size, state.len())?;

        match self.exploration.choose(self.train_steps, &mut self.rng) {
            Choice::Explore => {
                let action = self.rng.gen_range(0..self.action_size);
                trace!("explore: action {action}");
                Ok(action)
            }
            Choice::Exploit => {
                let scores = self.network.evaluate(state)?;
                let action = argmax(&scores);
                trace!("exploit: action {action}, scores {scores:?}");
                Ok(action)
            }
        }
    }

    /// The training target for a transition's action slot
    fn target(&self, transition: &Transition) -> Result<f32, AgentError> {
        if transition.terminal {
            return Ok(transition.reward);
        }
        let next_scores = self.network.evaluate(&transition.next_state)?;
        let max_next = next_scores.into_iter().fold(f32::NEG_INFINITY, f32::max);
        Ok(transition.reward + self.discount * max_next)
    }

    /// Perform one training step on a random batch of `batch_size` transitions
    ///
    /// ### Returns
    /// - `Ok(None)` without touching the weights or the exploration rate if the memory holds fewer than
    ///   `batch_size` transitions, or if `batch_size` is zero
    /// - `Ok(Some(error))` otherwise, where `error` is the mean absolute TD error of the batch before updating
    pub fn train(&mut self, batch_size: usize) -> Result<Option<f32>, AgentError> {
        if batch_size == 0 {
            return Ok(None);
        }

        let batch = match self.memory.sample(batch_size, &mut self.rng) {
            Ok(batch) => batch.into_iter().cloned().collect::<Vec<_>>(),
            Err(AgentError::InsufficientData {
                requested,
                available,
            }) => {
                trace!("skipping training: {available} of {requested} transitions stored");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let mut td_error = 0.0;
        let mut accumulated: Option<Gradients<B>> = None;
        for transition in &batch {
            let target = self.target(transition)?;
            let mut target_scores = self.network.evaluate(&transition.state)?;
            td_error += (target - target_scores[transition.action]).abs();
            target_scores[transition.action] = target;

            match self.update_mode {
                UpdateMode::PerSample => {
                    self.network
                        .update(&transition.state, &target_scores, self.learning_rate)?;
                }
                UpdateMode::BatchMean => {
                    let gradients = self.network.gradients(&transition.state, &target_scores)?;
                    accumulated = Some(match accumulated {
                        Some(acc) => acc + gradients,
                        None => gradients,
                    });
                }
            }
        }

        if let Some(gradients) = accumulated {
            self.network
                .apply(gradients * (1.0 / batch_size as f32), self.learning_rate);
        }

        self.train_steps = self.train_steps.saturating_add(1);
        let td_error = td_error / batch_size as f32;
        debug!(
            "train step {}: batch {batch_size}, mean |td error| {td_error:.4}, epsilon {:.4}",
            self.train_steps,
            self.exploration_rate()
        );
        Ok(Some(td_error))
    }

    /// Check the network's prediction for `state` against observed scores, tracking the error
    ///
    /// **Returns** whether the mean absolute error is below the network's reliability threshold
    pub fn is_prediction_reliable(
        &mut self,
        state: &[f32],
        actual: &[f32],
    ) -> Result<bool, AgentError> {
        let prediction = self.network.evaluate(state)?;
        AgentError::check_len("actual scores", prediction.len(), actual.len())?;
        Ok(self
            .network
            .errors_mut()
            .is_prediction_reliable(&prediction, actual))
    }

    /// Deploy the `DecisionAgent` into the environment for one episode
    ///
    /// Every step is recorded, and a training step on `batch_size` transitions runs after each step once the
    /// memory holds more than `batch_size` transitions.
    pub fn go<E: Environment>(
        &mut self,
        env: &mut E,
        batch_size: usize,
    ) -> Result<EpisodeReport, AgentError> {
        AgentError::check_len("environment state", self.state_size, env.state_size())?;
        AgentError::check_len("environment actions", self.action_size, env.action_size())?;

        let mut report = EpisodeReport::default();
        let mut td_errors = Vec::new();
        let mut state = env.reset();

        loop {
            let action = self.select_action(&state)?;
            let (next_state, reward, terminal) = env.step(action);
            self.record(state, action, reward, next_state.clone(), terminal)?;

            report.steps += 1;
            report.total_reward += reward;

            if self.memory.len() > batch_size {
                if let Some(error) = self.train(batch_size)? {
                    td_errors.push(error);
                }
            }

            if terminal {
                break;
            }
            state = next_state;
        }

        report.exploration_rate = self.exploration_rate();
        if !td_errors.is_empty() {
            report.mean_td_error = Some(td_errors.iter().sum::<f32>() / td_errors.len() as f32);
        }
        debug!(
            "episode finished after {} steps, total reward {:.2}",
            report.steps, report.total_reward
        );
        Ok(report)
    }
}
