use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

use crate::configuration::CliOverrides;

/// Instructions for a headless run, from `--text` or read from `--file`
pub fn read_instructions(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    match (text, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read instructions from {}", path.display())),
        (None, None) => Err(anyhow!("Either --text or --file must be provided")),
    }
}

pub async fn execute(
    overrides: &CliOverrides,
    text: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let instructions = read_instructions(text, file)?;
    if instructions.trim().is_empty() {
        return Err(anyhow!("Instructions are empty"));
    }

    // Run is a session with exactly one user turn
    let mut session = super::session::build_session(overrides)?;
    session.headless_start(instructions).await?;
    tracing::info!(
        messages = session.conversation().len(),
        "headless run finished"
    );
    Ok(())
}
