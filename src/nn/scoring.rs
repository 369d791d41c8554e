use std::ops::{Add, Mul};

use burn::tensor::{activation::relu, backend::Backend, Data, ElementConversion, Shape, Tensor};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::AgentError;

use super::ErrorTracker;

/// Configuration for a [`ScoringNetwork`]
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringNetworkConfig {
    pub state_size: usize,
    pub hidden_size: usize,
    pub action_size: usize,
    /// Weights are clamped to `[-c, c]` after every update when set
    pub weight_clip: Option<f32>,
}

impl ScoringNetworkConfig {
    pub fn new(state_size: usize, action_size: usize) -> Self {
        Self {
            state_size,
            hidden_size: 24,
            action_size,
            weight_clip: Some(2.0),
        }
    }
}

/// Weight adjustments for each layer of a [`ScoringNetwork`]
///
/// Each tensor points in the direction that reduces the squared difference between the network's scores and its
/// targets, so applying it means adding it (scaled by a learning rate) to the weights.
#[derive(Debug, Clone)]
pub struct Gradients<B: Backend> {
    w1: Tensor<B, 2>,
    w2: Tensor<B, 2>,
    w3: Tensor<B, 2>,
    /// Mean absolute difference between targets and scores
    error: f32,
}

impl<B: Backend> Gradients<B> {
    pub fn error(&self) -> f32 {
        self.error
    }
}

/// Sum two sets of gradients
impl<B: Backend> Add for Gradients<B> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            w1: self.w1.add(other.w1),
            w2: self.w2.add(other.w2),
            w3: self.w3.add(other.w3),
            error: self.error + other.error,
        }
    }
}

impl<B: Backend> Mul<f32> for Gradients<B> {
    type Output = Self;

    fn mul(self, factor: f32) -> Self {
        Self {
            w1: self.w1.mul_scalar(factor),
            w2: self.w2.mul_scalar(factor),
            w3: self.w3.mul_scalar(factor),
            error: self.error * factor,
        }
    }
}

/// A three layer feed-forward network scoring every action for a state vector
///
/// `scores = relu(relu(state · W1) · W2) · W3`
///
/// The weights are owned by the network and only change through [`apply`](ScoringNetwork::apply)
/// (or [`update`](ScoringNetwork::update)); their shapes are fixed at construction.
#[derive(Debug, Clone)]
pub struct ScoringNetwork<B: Backend> {
    w1: Tensor<B, 2>,
    w2: Tensor<B, 2>,
    w3: Tensor<B, 2>,
    weight_clip: Option<f32>,
    errors: ErrorTracker,
    device: B::Device,
}

impl<B: Backend> ScoringNetwork<B> {
    /// Initialize a network with random weights drawn from N(0, 2 / fan_in)
    ///
    /// **Panics** if any layer size is zero
    pub fn new<R: Rng + ?Sized>(
        config: &ScoringNetworkConfig,
        rng: &mut R,
        device: &B::Device,
    ) -> Self {
        let &ScoringNetworkConfig {
            state_size,
            hidden_size,
            action_size,
            weight_clip,
        } = config;
        assert!(
            state_size > 0 && hidden_size > 0 && action_size > 0,
            "Layer sizes must be nonzero."
        );

        let mut init = |rows: usize, cols: usize| {
            let std = (2.0 / rows as f32).sqrt();
            let values = (0..rows * cols)
                .map(|_| {
                    let x: f32 = StandardNormal.sample(&mut *rng);
                    x * std
                })
                .collect::<Vec<_>>();
            matrix::<B>(values, rows, cols, device)
        };

        Self {
            w1: init(state_size, hidden_size),
            w2: init(hidden_size, hidden_size),
            w3: init(hidden_size, action_size),
            weight_clip,
            errors: ErrorTracker::default(),
            device: device.clone(),
        }
    }

    /// Construct a network from explicit row-major weight matrices, without weight clipping
    ///
    /// Fails with [`AgentError::ShapeMismatch`] if a matrix is empty or ragged, or if consecutive layers do not chain.
    pub fn from_weights(
        w1: Vec<Vec<f32>>,
        w2: Vec<Vec<f32>>,
        w3: Vec<Vec<f32>>,
        device: &B::Device,
    ) -> Result<Self, AgentError> {
        let (state_size, hidden_size) = dims("W1", &w1)?;
        let (w2_rows, w2_cols) = dims("W2", &w2)?;
        let (w3_rows, action_size) = dims("W3", &w3)?;
        AgentError::check_len("W2 rows", hidden_size, w2_rows)?;
        AgentError::check_len("W2 columns", hidden_size, w2_cols)?;
        AgentError::check_len("W3 rows", hidden_size, w3_rows)?;

        let flat = |m: Vec<Vec<f32>>| m.into_iter().flatten().collect::<Vec<_>>();
        Ok(Self {
            w1: matrix::<B>(flat(w1), state_size, hidden_size, device),
            w2: matrix::<B>(flat(w2), hidden_size, hidden_size, device),
            w3: matrix::<B>(flat(w3), hidden_size, action_size, device),
            weight_clip: None,
            errors: ErrorTracker::default(),
            device: device.clone(),
        })
    }

    pub fn with_weight_clip(mut self, weight_clip: Option<f32>) -> Self {
        self.weight_clip = weight_clip;
        self.clip();
        self
    }

    pub fn state_size(&self) -> usize {
        self.w1.dims()[0]
    }

    pub fn hidden_size(&self) -> usize {
        self.w2.dims()[0]
    }

    pub fn action_size(&self) -> usize {
        self.w3.dims()[1]
    }

    pub fn weight_clip(&self) -> Option<f32> {
        self.weight_clip
    }

    /// History of the mean absolute error of every applied update
    pub fn errors(&self) -> &ErrorTracker {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut ErrorTracker {
        &mut self.errors
    }

    /// Row-major copies of the three weight matrices
    pub fn weights(&self) -> [Vec<f32>; 3] {
        [&self.w1, &self.w2, &self.w3].map(|w| to_vec(w.clone()))
    }

    fn input(&self, state: &[f32]) -> Result<Tensor<B, 2>, AgentError> {
        AgentError::check_len("state", self.state_size(), state.len())?;
        Ok(matrix::<B>(state.to_vec(), 1, state.len(), &self.device))
    }

    /// Forward pass returning the activations of both hidden layers and the output
    fn forward(&self, input: Tensor<B, 2>) -> [Tensor<B, 2>; 3] {
        let h1 = relu(input.matmul(self.w1.clone()));
        let h2 = relu(h1.clone().matmul(self.w2.clone()));
        let scores = h2.clone().matmul(self.w3.clone());
        [h1, h2, scores]
    }

    /// Score every action for `state`
    pub fn evaluate(&self, state: &[f32]) -> Result<Vec<f32>, AgentError> {
        let [_, _, scores] = self.forward(self.input(state)?);
        Ok(to_vec(scores))
    }

    /// Back-propagate `target_scores - evaluate(state)` through every layer
    ///
    /// The result equals the negated autodiff gradient of `½‖target_scores - evaluate(state)‖²`.
    pub fn gradients(
        &self,
        state: &[f32],
        target_scores: &[f32],
    ) -> Result<Gradients<B>, AgentError> {
        let x = self.input(state)?;
        AgentError::check_len("target scores", self.action_size(), target_scores.len())?;
        let target = matrix::<B>(
            target_scores.to_vec(),
            1,
            target_scores.len(),
            &self.device,
        );

        let [h1, h2, scores] = self.forward(x.clone());
        let delta = target.sub(scores);
        let error = delta.clone().abs().mean().into_scalar().elem::<f32>();

        let w3 = h2.clone().transpose().matmul(delta.clone());
        let d2 = delta
            .matmul(self.w3.clone().transpose())
            .mul(h2.greater_elem(0.0).float());
        let w2 = h1.clone().transpose().matmul(d2.clone());
        let d1 = d2
            .matmul(self.w2.clone().transpose())
            .mul(h1.greater_elem(0.0).float());
        let w1 = x.transpose().matmul(d1);

        Ok(Gradients { w1, w2, w3, error })
    }

    /// Add `learning_rate * gradients` to the weights, then clip them if configured
    pub fn apply(&mut self, gradients: Gradients<B>, learning_rate: f32) {
        let Gradients { w1, w2, w3, error } = gradients;
        self.w1 = self.w1.clone().add(w1.mul_scalar(learning_rate));
        self.w2 = self.w2.clone().add(w2.mul_scalar(learning_rate));
        self.w3 = self.w3.clone().add(w3.mul_scalar(learning_rate));
        self.clip();
        self.errors.track(error);
    }

    /// Perform a single gradient step moving `evaluate(state)` toward `target_scores`
    pub fn update(
        &mut self,
        state: &[f32],
        target_scores: &[f32],
        learning_rate: f32,
    ) -> Result<(), AgentError> {
        let gradients = self.gradients(state, target_scores)?;
        self.apply(gradients, learning_rate);
        Ok(())
    }

    fn clip(&mut self) {
        if let Some(c) = self.weight_clip {
            self.w1 = self.w1.clone().clamp(-c, c);
            self.w2 = self.w2.clone().clamp(-c, c);
            self.w3 = self.w3.clone().clamp(-c, c);
        }
    }
}

fn dims(what: &'static str, m: &[Vec<f32>]) -> Result<(usize, usize), AgentError> {
    let rows = m.len();
    let cols = m.first().map_or(0, Vec::len);
    if rows == 0 || cols == 0 {
        return Err(AgentError::ShapeMismatch {
            what,
            expected: 1,
            actual: 0,
        });
    }
    for row in m {
        AgentError::check_len(what, cols, row.len())?;
    }
    Ok((rows, cols))
}

fn matrix<B: Backend>(
    values: Vec<f32>,
    rows: usize,
    cols: usize,
    device: &B::Device,
) -> Tensor<B, 2> {
    Tensor::from_floats(Data::new(values, Shape::new([rows, cols])), device)
}

fn to_vec<B: Backend>(tensor: Tensor<B, 2>) -> Vec<f32> {
    tensor.into_data().convert::<f32>().value
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    type B = NdArray;

    fn assert_close(a: &[f32], b: &[f32]) {
        assert_eq!(a.len(), b.len(), "lengths match");
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-5, "{a:?} != {b:?}");
        }
    }

    fn unit_network() -> ScoringNetwork<B> {
        ScoringNetwork::from_weights(
            vec![vec![1.0]],
            vec![vec![1.0]],
            vec![vec![1.0]],
            &Default::default(),
        )
        .unwrap()
    }

    #[test]
    fn evaluate_known_weights() {
        let net = ScoringNetwork::<B>::from_weights(
            vec![vec![1.0, 0.0], vec![0.0, -1.0]],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            &Default::default(),
        )
        .unwrap();

        // h1 = relu([1, -2]) = [1, 0]
        assert_eq!(net.evaluate(&[1.0, 2.0]).unwrap(), [1.0, 2.0]);
        // h1 = relu([-1, 0]) = [0, 0]
        assert_eq!(net.evaluate(&[-1.0, 0.0]).unwrap(), [0.0, 0.0]);
    }

    #[test]
    fn evaluate_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(3);
        let net = ScoringNetwork::<B>::new(
            &ScoringNetworkConfig::new(4, 3),
            &mut rng,
            &Default::default(),
        );
        let state = [0.1, 0.7, 0.3, 0.9];
        let first = net.evaluate(&state).unwrap();
        assert_eq!(first.len(), 3);
        for _ in 0..10 {
            assert_eq!(net.evaluate(&state).unwrap(), first);
        }
    }

    #[test]
    fn initialization_respects_config() {
        let mut rng = StdRng::seed_from_u64(11);
        let config = ScoringNetworkConfig::new(10, 4);
        let net = ScoringNetwork::<B>::new(&config, &mut rng, &Default::default());

        assert_eq!(net.state_size(), 10);
        assert_eq!(net.hidden_size(), 24);
        assert_eq!(net.action_size(), 4);
        assert_eq!(net.weight_clip(), Some(2.0));

        let [w1, w2, w3] = net.weights();
        assert_eq!(w1.len(), 10 * 24);
        assert_eq!(w2.len(), 24 * 24);
        assert_eq!(w3.len(), 24 * 4);
        assert!(w1.iter().chain(&w2).chain(&w3).all(|w| w.is_finite()));
        assert!(w1.iter().any(|&w| w != 0.0), "weights are randomized");
    }

    #[test]
    fn shape_mismatch() {
        let net = unit_network();
        assert_eq!(
            net.evaluate(&[1.0, 2.0]),
            Err(AgentError::ShapeMismatch {
                what: "state",
                expected: 1,
                actual: 2
            })
        );
        assert!(matches!(
            net.gradients(&[1.0], &[1.0, 2.0]),
            Err(AgentError::ShapeMismatch {
                what: "target scores",
                ..
            })
        ));

        let ragged = ScoringNetwork::<B>::from_weights(
            vec![vec![1.0, 2.0], vec![1.0]],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![vec![1.0], vec![1.0]],
            &Default::default(),
        );
        assert!(ragged.is_err(), "ragged matrices are rejected");

        let unchained = ScoringNetwork::<B>::from_weights(
            vec![vec![1.0, 2.0]],
            vec![vec![1.0]],
            vec![vec![1.0]],
            &Default::default(),
        );
        assert!(unchained.is_err(), "layers must chain");
    }

    #[test]
    fn update_follows_layered_gradient() {
        let mut net = unit_network();
        assert_eq!(net.evaluate(&[1.0]).unwrap(), [1.0]);

        // delta = 2, every layer's gradient is 2 with unit weights and input
        net.update(&[1.0], &[3.0], 0.1).unwrap();

        let [w1, w2, w3] = net.weights();
        assert_close(&w1, &[1.2]);
        assert_close(&w2, &[1.2]);
        assert_close(&w3, &[1.2]);
        assert_close(&net.evaluate(&[1.0]).unwrap(), &[1.728]);
        assert_eq!(net.errors().latest(), Some(2.0), "update error tracked");
    }

    #[test]
    fn update_skips_inactive_units() {
        // The second hidden unit is inactive, so its incoming and outgoing weights must not change
        let mut net = ScoringNetwork::<B>::from_weights(
            vec![vec![1.0, -1.0]],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![vec![1.0], vec![1.0]],
            &Default::default(),
        )
        .unwrap();
        net.update(&[1.0], &[2.0], 0.5).unwrap();

        let [w1, w2, w3] = net.weights();
        assert_close(&w1, &[1.5, -1.0]);
        assert_close(&w2, &[1.5, 0.0, 0.0, 1.0]);
        assert_close(&w3, &[1.5, 1.0]);
    }

    #[test]
    fn update_reduces_error() {
        let mut net = ScoringNetwork::<B>::from_weights(
            vec![vec![0.5, 0.5]],
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
            &Default::default(),
        )
        .unwrap();
        let target = [1.0, 0.5];
        let before = net.evaluate(&[1.0]).unwrap();
        for _ in 0..20 {
            net.update(&[1.0], &target, 0.05).unwrap();
        }
        let after = net.evaluate(&[1.0]).unwrap();
        assert!((after[0] - target[0]).abs() < (before[0] - target[0]).abs());
    }

    #[test]
    fn weights_are_clipped() {
        let mut net = unit_network().with_weight_clip(Some(1.1));
        net.update(&[1.0], &[100.0], 0.1).unwrap();
        for w in net.weights() {
            assert_close(&w, &[1.1]);
        }

        let net = ScoringNetwork::<B>::from_weights(
            vec![vec![5.0]],
            vec![vec![-5.0]],
            vec![vec![0.5]],
            &Default::default(),
        )
        .unwrap()
        .with_weight_clip(Some(2.0));
        let [w1, w2, w3] = net.weights();
        assert_close(&w1, &[2.0]);
        assert_close(&w2, &[-2.0]);
        assert_close(&w3, &[0.5]);
    }

    #[test]
    fn gradients_average() {
        let net = unit_network();
        let g = net.gradients(&[1.0], &[3.0]).unwrap();
        assert_eq!(g.error(), 2.0);

        let mean = (g.clone() + g.clone() + g) * (1.0 / 3.0);
        assert!((mean.error() - 2.0).abs() < 1e-6);

        let mut averaged = unit_network();
        averaged.apply(mean, 0.1);
        let mut single = unit_network();
        single.update(&[1.0], &[3.0], 0.1).unwrap();
        for (a, b) in averaged.weights().iter().zip(single.weights().iter()) {
            assert_close(a, b);
        }
    }
}
