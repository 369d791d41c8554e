mod decision_agent;

pub use decision_agent::{DecisionAgent, DecisionAgentConfig, EpisodeReport, UpdateMode};
