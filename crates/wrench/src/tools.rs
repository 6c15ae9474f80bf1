//! Built-in tools the model can call.
//!
//! Each tool is a thin wrapper: deserialize the raw arguments, check the preconditions, run
//! one filesystem or git operation and describe the outcome in a sentence.
pub mod fs;
pub mod git;
pub mod patch;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{AgentError, AgentResult};
use crate::registry::ToolDefinition;

/// Every built-in tool, in the order they are advertised
pub fn default_tools() -> Vec<ToolDefinition> {
    vec![
        fs::read_file_definition(),
        fs::list_files_definition(),
        patch::edit_file_definition(),
        fs::make_dir_definition(),
        fs::delete_dir_definition(),
        git::status_definition(),
        git::add_definition(),
        git::commit_definition(),
        git::push_definition(),
        git::pull_definition(),
    ]
}

/// Deserialize a tool's argument payload; serde's message is what the model gets back
pub(crate) fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> AgentResult<T> {
    // Models sometimes send `null` for tools without parameters
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    Ok(serde_json::from_value(arguments)?)
}

pub(crate) fn require_path(path: &str) -> AgentResult<()> {
    if path.is_empty() {
        return Err(AgentError::InvalidParameters("path cannot be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct PathInput {
        path: String,
    }

    #[derive(Debug, Deserialize)]
    struct NoInput {}

    #[test]
    fn test_parse_arguments_reports_missing_field() {
        let err = parse_arguments::<PathInput>(json!({})).unwrap_err();
        match err {
            AgentError::InvalidParameters(msg) => assert!(msg.contains("missing field `path`")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_parse_arguments_rejects_wrong_shape() {
        let err = parse_arguments::<PathInput>(json!("{\"path\": ")).unwrap_err();
        assert!(matches!(err, AgentError::InvalidParameters(_)));
    }

    #[test]
    fn test_parse_arguments_accepts_null_for_empty_input() {
        assert!(parse_arguments::<NoInput>(Value::Null).is_ok());
        let input: PathInput = parse_arguments(json!({"path": "a.txt"})).unwrap();
        assert_eq!(input.path, "a.txt");
    }

    #[test]
    fn test_require_path() {
        assert!(require_path("src").is_ok());
        assert_eq!(
            require_path("").unwrap_err().to_string(),
            "path cannot be empty"
        );
    }
}
