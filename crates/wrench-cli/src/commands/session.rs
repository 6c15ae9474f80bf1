use anyhow::{Context, Result};

use crate::configuration::{CliOverrides, Settings};
use crate::prompt::rustyline::RustylinePrompt;
use crate::session::Session;
use wrench::agent::Agent;
use wrench::providers::factory;
use wrench::registry::{ToolRegistry, Workspace};

pub fn build_session<'a>(overrides: &CliOverrides) -> Result<Session<'a>> {
    let settings = Settings::with_overrides(overrides)?;
    let model = settings.provider.model().to_string();
    tracing::info!(provider = ?settings.provider.provider_type(), model = %model, "starting session");

    let workspace = Workspace::current()
        .context("Failed to determine the working directory")?
        .with_author(settings.git.author());
    let registry = ToolRegistry::with_default_tools(workspace)?;

    let provider = factory::get_provider(settings.provider.into_config())?;
    let agent = Agent::new(provider, registry);
    let prompt = RustylinePrompt::new(model)?;

    Ok(Session::new(agent, Box::new(prompt)))
}

pub async fn execute(overrides: &CliOverrides) -> Result<()> {
    let mut session = build_session(overrides)?;
    session.start().await
}
