use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The schema of a tool as it is advertised to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does, read by the model to decide when to call it
    pub description: String,
    /// JSON schema object describing the named parameters
    pub input_schema: Value,
}

impl Tool {
    pub fn new<N, D>(name: N, description: D, input_schema: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    /// Names of the parameters the schema marks as required
    pub fn required(&self) -> Vec<&str> {
        self.input_schema
            .get("required")
            .and_then(|r| r.as_array())
            .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// The name of the tool to execute
    pub name: String,
    /// The raw argument payload, exactly as the model produced it
    pub arguments: Value,
}

impl ToolCall {
    pub fn new<S: Into<String>>(name: S, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_parameters() {
        let tool = Tool::new(
            "edit_file",
            "Edit",
            json!({
                "type": "object",
                "properties": {"path": {"type": "string"}, "old_str": {"type": "string"}},
                "required": ["path"]
            }),
        );
        assert_eq!(tool.required(), vec!["path"]);

        let no_params = Tool::new("git_status", "Status", json!({"type": "object", "properties": {}}));
        assert!(no_params.required().is_empty());
    }
}
