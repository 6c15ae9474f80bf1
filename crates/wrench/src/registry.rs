use anyhow::{anyhow, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::{AgentError, AgentResult};
use crate::models::tool::{Tool, ToolCall};
use crate::tools;

/// Identity recorded on commits made by the `git_commit` tool
#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Default for Author {
    fn default() -> Self {
        Self {
            name: "AI Agent".to_string(),
            email: "ai@agent.local".to_string(),
        }
    }
}

/// The directory every tool path is resolved against
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    author: Author,
}

impl Workspace {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            author: Author::default(),
        }
    }

    /// A workspace rooted at the process working directory
    pub fn current() -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn with_author(mut self, author: Author) -> Self {
        self.author = author;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    /// Relative paths are joined onto the root, absolute paths are taken as given
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

/// Executes a tool against the workspace with the raw argument payload
pub type Executor = fn(&Workspace, Value) -> AgentResult<String>;

#[derive(Clone)]
pub struct ToolDefinition {
    pub tool: Tool,
    pub executor: Executor,
}

impl ToolDefinition {
    pub fn new(tool: Tool, executor: Executor) -> Self {
        Self { tool, executor }
    }

    pub fn name(&self) -> &str {
        &self.tool.name
    }
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("tool", &self.tool)
            .finish_non_exhaustive()
    }
}

/// Immutable table from tool name to definition, built once at startup
#[derive(Debug)]
pub struct ToolRegistry {
    workspace: Workspace,
    definitions: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new(workspace: Workspace, definitions: Vec<ToolDefinition>) -> Result<Self> {
        let mut index = HashMap::new();
        for (position, definition) in definitions.iter().enumerate() {
            if index
                .insert(definition.name().to_string(), position)
                .is_some()
            {
                return Err(anyhow!("Duplicate tool name: {}", definition.name()));
            }
        }

        Ok(Self {
            workspace,
            definitions,
            index,
        })
    }

    /// Registry holding the built-in file, directory and git tools
    pub fn with_default_tools(workspace: Workspace) -> Result<Self> {
        Self::new(workspace, tools::default_tools())
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Exported schemas in registration order
    pub fn tools(&self) -> Vec<Tool> {
        self.definitions.iter().map(|d| d.tool.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&i| &self.definitions[i])
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Run one tool call. Every failure comes back as an `AgentError` for the model to read.
    pub fn dispatch(&self, call: &ToolCall) -> AgentResult<String> {
        tracing::info!(tool = %call.name, arguments = %call.arguments, "dispatching tool call");
        let definition = self.get(&call.name).ok_or_else(|| {
            tracing::warn!(tool = %call.name, "model requested an unknown tool");
            AgentError::ToolNotFound(call.name.clone())
        })?;

        let result = (definition.executor)(&self.workspace, call.arguments.clone());
        if let Err(e) = &result {
            tracing::debug!(tool = %call.name, error = %e, "tool call failed");
        }
        result
    }
}
