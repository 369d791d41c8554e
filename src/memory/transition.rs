/// A single recorded step of experience
///
/// Transitions are immutable once recorded: the replay memory only hands out shared references.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// The state of the environment before taking the action
    pub state: Vec<f32>,
    /// The index of the action taken in the given state
    pub action: usize,
    /// The reward received after taking the action
    pub reward: f32,
    /// The state of the environment after the action is taken
    pub next_state: Vec<f32>,
    /// Whether `next_state` ended the episode
    pub terminal: bool,
}

impl Transition {
    pub fn new(
        state: Vec<f32>,
        action: usize,
        reward: f32,
        next_state: Vec<f32>,
        terminal: bool,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            terminal,
        }
    }
}
