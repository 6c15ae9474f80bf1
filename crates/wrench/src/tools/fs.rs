use serde::Deserialize;
use serde_json::{json, Value};
use std::fs;
use walkdir::WalkDir;

use super::{parse_arguments, require_path};
use crate::errors::{AgentError, AgentResult};
use crate::models::tool::Tool;
use crate::registry::{ToolDefinition, Workspace};

#[derive(Debug, Deserialize)]
struct ReadFileInput {
    path: String,
}

#[derive(Debug, Deserialize)]
struct ListFilesInput {
    #[serde(default)]
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirInput {
    path: String,
}

pub fn read_file_definition() -> ToolDefinition {
    ToolDefinition::new(
        Tool::new(
            "read_file",
            "Read the contents of a given relative file path. Use this when you want to see \
            what's inside a file. Do not use this with directory names.",
            json!({
                "type": "object",
                "required": ["path"],
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "The relative path of a file in the working directory."
                    }
                }
            }),
        ),
        read_file,
    )
}

pub fn list_files_definition() -> ToolDefinition {
    ToolDefinition::new(
        Tool::new(
            "list_files",
            "List files and directories at a given path. If no path is provided, lists files \
            in the current directory.",
            json!({
                "type": "object",
                "required": [],
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Optional relative path to list files from. Defaults to current directory if not provided."
                    }
                }
            }),
        ),
        list_files,
    )
}

pub fn make_dir_definition() -> ToolDefinition {
    ToolDefinition::new(
        Tool::new(
            "make_dir",
            "Creates a new directory at the specified path. If parent directories don't exist, \
            they will be created as well.",
            json!({
                "type": "object",
                "required": ["path"],
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "The relative path of the directory to create"
                    }
                }
            }),
        ),
        make_dir,
    )
}

pub fn delete_dir_definition() -> ToolDefinition {
    ToolDefinition::new(
        Tool::new(
            "delete_dir",
            "Deletes a directory and all its contents recursively. Use with caution as this \
            operation cannot be undone.",
            json!({
                "type": "object",
                "required": ["path"],
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "The relative path of the directory to delete"
                    }
                }
            }),
        ),
        delete_dir,
    )
}

pub fn read_file(workspace: &Workspace, arguments: Value) -> AgentResult<String> {
    let input: ReadFileInput = parse_arguments(arguments)?;
    require_path(&input.path)?;

    let bytes = fs::read(workspace.resolve(&input.path)).map_err(|e| {
        AgentError::ExecutionError(format!("failed to read file {}: {}", input.path, e))
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn list_files(workspace: &Workspace, arguments: Value) -> AgentResult<String> {
    let input: ListFilesInput = parse_arguments(arguments)?;
    let dir = match input.path.as_deref() {
        Some(path) if !path.is_empty() => workspace.resolve(path),
        _ => workspace.root().to_path_buf(),
    };

    let mut files = Vec::new();
    for entry in WalkDir::new(&dir).sort_by_file_name() {
        let entry = entry.map_err(|e| AgentError::ExecutionError(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(&dir)
            .map_err(|e| AgentError::Internal(e.to_string()))?;
        if relative.as_os_str().is_empty() {
            continue;
        }

        let relative = relative.to_string_lossy().into_owned();
        if entry.file_type().is_dir() {
            files.push(format!("{}/", relative));
        } else {
            files.push(relative);
        }
    }

    serde_json::to_string(&files).map_err(|e| AgentError::Internal(e.to_string()))
}

pub fn make_dir(workspace: &Workspace, arguments: Value) -> AgentResult<String> {
    let input: DirInput = parse_arguments(arguments)?;
    require_path(&input.path)?;

    fs::create_dir_all(workspace.resolve(&input.path)).map_err(|e| {
        AgentError::ExecutionError(format!("failed to create directory: {}", e))
    })?;
    Ok(format!("Successfully created directory {}", input.path))
}

pub fn delete_dir(workspace: &Workspace, arguments: Value) -> AgentResult<String> {
    let input: DirInput = parse_arguments(arguments)?;
    require_path(&input.path)?;

    let target = workspace.resolve(&input.path);
    let metadata = match fs::symlink_metadata(&target) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AgentError::ExecutionError(format!(
                "directory does not exist: {}",
                input.path
            )));
        }
        Err(e) => {
            return Err(AgentError::ExecutionError(format!(
                "error checking directory: {}",
                e
            )));
        }
    };
    if !metadata.is_dir() {
        return Err(AgentError::InvalidParameters(format!(
            "not a directory: {}",
            input.path
        )));
    }

    fs::remove_dir_all(&target).map_err(|e| {
        AgentError::ExecutionError(format!("failed to delete directory: {}", e))
    })?;
    Ok(format!(
        "Successfully deleted directory {} and all its contents",
        input.path
    ))
}
