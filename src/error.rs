use thiserror::Error;

/// Errors produced by the decision agent and its components
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgentError {
    /// A vector or matrix does not have the length the agent was configured with
    #[error("{what} has length {actual}, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    /// More experiences were requested than the replay memory holds
    #[error("requested {requested} experiences but only {available} are stored")]
    InsufficientData { requested: usize, available: usize },
    /// An action index outside `[0, action_size)`
    #[error("action {action} is out of range for {action_size} actions")]
    InvalidAction { action: usize, action_size: usize },
}

impl AgentError {
    /// Returns `Ok(())` if `actual == expected`, otherwise a [`AgentError::ShapeMismatch`]
    pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), Self> {
        (expected == actual)
            .then_some(())
            .ok_or(Self::ShapeMismatch {
                what,
                expected,
                actual,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_len_functional() {
        assert!(AgentError::check_len("state", 4, 4).is_ok());
        assert_eq!(
            AgentError::check_len("state", 4, 3),
            Err(AgentError::ShapeMismatch {
                what: "state",
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn error_messages() {
        let err = AgentError::ShapeMismatch {
            what: "state",
            expected: 4,
            actual: 3,
        };
        assert_eq!(err.to_string(), "state has length 3, expected 4");

        let err = AgentError::InsufficientData {
            requested: 8,
            available: 0,
        };
        assert_eq!(
            err.to_string(),
            "requested 8 experiences but only 0 are stored"
        );
    }
}
