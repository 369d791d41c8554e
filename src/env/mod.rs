/// A source of experience for a [`DecisionAgent`](crate::algo::DecisionAgent)
///
/// Represents an episodic environment with a fixed-length numeric state vector and a finite set of
/// actions indexed `0..action_size`.
pub trait Environment {
    /// Length of every state vector produced by the environment
    fn state_size(&self) -> usize;

    /// Number of discrete actions accepted by [`step`](Environment::step)
    fn action_size(&self) -> usize;

    /// Reset the environment to an initial state
    ///
    /// **Returns** the state
    fn reset(&mut self) -> Vec<f32>;

    /// Update the environment in response to an action taken by an agent
    ///
    /// **Returns** `(next_state, reward, terminal)`
    fn step(&mut self, action: usize) -> (Vec<f32>, f32, bool);
}
