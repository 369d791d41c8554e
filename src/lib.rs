//! An experience replay decision agent for game automation.
//!
//! The [`DecisionAgent`](algo::DecisionAgent) records transitions into a bounded replay memory, chooses actions
//! epsilon-greedily from a small feed-forward scoring network, and trains that network on random batches of
//! remembered experience.

/// The decision agent
pub mod algo;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Data structures
pub mod ds;

/// Environment
pub mod env;

/// Error types
pub mod error;

/// Exploration policies
pub mod exploration;

/// Experience replay
pub mod memory;

/// Scoring networks
pub mod nn;

/// Testing environments
#[cfg(feature = "gym")]
pub mod gym;

mod util;

pub use error::AgentError;
