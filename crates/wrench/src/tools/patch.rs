use indoc::indoc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::parse_arguments;
use crate::errors::{AgentError, AgentResult};
use crate::models::tool::Tool;
use crate::registry::{ToolDefinition, Workspace};

#[derive(Debug, Deserialize)]
struct EditFileInput {
    path: String,
    #[serde(default)]
    old_str: String,
    new_str: String,
}

/// What an edit did to the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The file did not exist and was written with the new text
    Created,
    /// Every occurrence of the old text was replaced
    Replaced { occurrences: usize },
}

pub fn edit_file_definition() -> ToolDefinition {
    ToolDefinition::new(
        Tool::new(
            "edit_file",
            indoc! {"
                Make edits to a text file.
                Replaces 'old_str' with 'new_str' in the given file. 'old_str' and 'new_str' MUST be different from each other.
                If the file specified with path doesn't exist, it will be created.
            "},
            json!({
                "type": "object",
                "required": ["path", "old_str", "new_str"],
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "The path to the file"
                    },
                    "old_str": {
                        "type": "string",
                        "description": "Text to search for - must match exactly and must only have one match exactly"
                    },
                    "new_str": {
                        "type": "string",
                        "description": "Text to replace old_str with"
                    }
                }
            }),
        ),
        edit_file,
    )
}

pub fn edit_file(workspace: &Workspace, arguments: Value) -> AgentResult<String> {
    let input: EditFileInput = parse_arguments(arguments)?;
    if input.path.is_empty() || input.old_str == input.new_str {
        return Err(AgentError::InvalidParameters(
            "invalid input parameters".into(),
        ));
    }

    match apply_edit(workspace, &input.path, &input.old_str, &input.new_str)? {
        EditOutcome::Created => Ok(format!("Successfully created file {}", input.path)),
        EditOutcome::Replaced { .. } => Ok("OK".to_string()),
    }
}

/// Global, left-to-right, non-overlapping literal replacement.
///
/// Returns the new content and how many occurrences were replaced. An empty `old` matches
/// before every character and once at the end.
pub fn replace_all(content: &str, old: &str, new: &str) -> (String, usize) {
    let occurrences = content.matches(old).count();
    if occurrences == 0 {
        return (content.to_string(), 0);
    }
    (content.replace(old, new), occurrences)
}

/// Replace `old` with `new` in the file at `path` (relative to the workspace), or create the
/// file when it is missing and `old` is empty.
pub fn apply_edit(
    workspace: &Workspace,
    path: &str,
    old: &str,
    new: &str,
) -> AgentResult<EditOutcome> {
    let resolved = workspace.resolve(path);
    let bytes = match fs::read(&resolved) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound && old.is_empty() => {
            create_file(&resolved, new)?;
            return Ok(EditOutcome::Created);
        }
        Err(e) => {
            return Err(AgentError::ExecutionError(format!(
                "failed to read file {}: {}",
                path, e
            )));
        }
    };

    let content = String::from_utf8(bytes).map_err(|_| {
        AgentError::ExecutionError(format!("{} is not a UTF-8 text file", path))
    })?;

    let (updated, occurrences) = replace_all(&content, old, new);
    if occurrences == 0 {
        return Err(AgentError::ExecutionError(
            "old_str not found in file".into(),
        ));
    }

    fs::write(&resolved, updated)
        .map_err(|e| AgentError::ExecutionError(format!("failed to write file {}: {}", path, e)))?;
    tracing::debug!(path = %path, occurrences, "applied edit");

    Ok(EditOutcome::Replaced { occurrences })
}

fn create_file(path: &Path, content: &str) -> AgentResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                AgentError::ExecutionError(format!("failed to create directory: {}", e))
            })?;
        }
    }

    fs::write(path, content)
        .map_err(|e| AgentError::ExecutionError(format!("failed to create file: {}", e)))?;
    tracing::debug!(path = %path.display(), "created file");
    Ok(())
}
