use super::{
    anthropic::AnthropicProvider, base::Provider, configs::ProviderConfig,
    openai::OpenAiProvider,
};
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Anthropic,
    OpenAi,
}

impl ProviderConfig {
    pub fn provider_type(&self) -> ProviderType {
        match self {
            ProviderConfig::Anthropic(_) => ProviderType::Anthropic,
            ProviderConfig::OpenAi(_) => ProviderType::OpenAi,
        }
    }
}

pub fn get_provider(config: ProviderConfig) -> Result<Box<dyn Provider>> {
    tracing::debug!(provider = ?config.provider_type(), model = config.model(), "creating provider");
    match config {
        ProviderConfig::Anthropic(anthropic_config) => {
            Ok(Box::new(AnthropicProvider::new(anthropic_config)?))
        }
        ProviderConfig::OpenAi(openai_config) => Ok(Box::new(OpenAiProvider::new(openai_config)?)),
    }
}
