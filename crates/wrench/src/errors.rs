use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures that are reported back to the model as error-flagged tool results.
///
/// None of these abort a conversation; transport failures travel separately as
/// `anyhow::Error` and end the run.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    /// The model asked for a name the registry does not know. The name is kept for logs,
    /// the model only ever sees the fixed text.
    #[error("tool not found")]
    ToolNotFound(String),

    #[error("{0}")]
    InvalidParameters(String),

    #[error("{0}")]
    ExecutionError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AgentResult<T> = Result<T, AgentError>;

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::InvalidParameters(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_not_found_hides_name() {
        let err = AgentError::ToolNotFound("frobnicate".to_string());
        assert_eq!(err.to_string(), "tool not found");
    }

    #[test]
    fn test_messages_are_verbatim() {
        assert_eq!(
            AgentError::InvalidParameters("invalid input parameters".into()).to_string(),
            "invalid input parameters"
        );
        assert_eq!(
            AgentError::ExecutionError("old_str not found in file".into()).to_string(),
            "old_str not found in file"
        );
    }

    #[test]
    fn test_serde_error_becomes_invalid_parameters() {
        let err: AgentError = serde_json::from_str::<u32>("\"nope\"").unwrap_err().into();
        assert!(matches!(err, AgentError::InvalidParameters(_)));
    }
}
