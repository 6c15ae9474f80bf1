use crate::error::{to_env_var, ConfigError, ENV_PREFIX};
use config::{Config, Environment};
use serde::Deserialize;
use wrench::providers::configs::{
    AnthropicProviderConfig, OpenAiProviderConfig, ProviderConfig, ANTHROPIC_HOST,
    ANTHROPIC_MODEL, DEFAULT_MAX_TOKENS, OPENAI_HOST, OPENAI_MODEL,
};
use wrench::providers::factory::ProviderType;
use wrench::registry::Author;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum ProviderSettings {
    Anthropic {
        #[serde(default = "default_anthropic_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_anthropic_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default = "default_max_tokens")]
        max_tokens: Option<i32>,
    },
    OpenAi {
        #[serde(default = "default_openai_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default = "default_max_tokens")]
        max_tokens: Option<i32>,
    },
}

impl ProviderSettings {
    pub fn provider_type(&self) -> ProviderType {
        match self {
            ProviderSettings::Anthropic { .. } => ProviderType::Anthropic,
            ProviderSettings::OpenAi { .. } => ProviderType::OpenAi,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ProviderSettings::Anthropic { model, .. } => model,
            ProviderSettings::OpenAi { model, .. } => model,
        }
    }

    // Convert to the wrench ProviderConfig
    pub fn into_config(self) -> ProviderConfig {
        match self {
            ProviderSettings::Anthropic {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            } => ProviderConfig::Anthropic(AnthropicProviderConfig {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            }),
            ProviderSettings::OpenAi {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            } => ProviderConfig::OpenAi(OpenAiProviderConfig {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GitSettings {
    #[serde(default = "default_author_name")]
    pub author_name: String,
    #[serde(default = "default_author_email")]
    pub author_email: String,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            author_name: default_author_name(),
            author_email: default_author_email(),
        }
    }
}

impl GitSettings {
    pub fn author(&self) -> Author {
        Author {
            name: self.author_name.clone(),
            email: self.author_email.clone(),
        }
    }
}

/// Values given on the command line; they win over the environment
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub provider: ProviderSettings,
    #[serde(default)]
    pub git: GitSettings,
}

impl Settings {
    #[cfg(test)]
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate(&CliOverrides::default())
    }

    pub fn with_overrides(overrides: &CliOverrides) -> Result<Self, ConfigError> {
        Self::load_and_validate(overrides)
    }

    fn load_and_validate(overrides: &CliOverrides) -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Provider defaults, the rest depend on the provider type
            .set_default("provider.type", "anthropic")?
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("provider.type", overrides.provider.clone())?
            .set_override_option("provider.model", overrides.model.clone())?
            .set_override_option("provider.max_tokens", overrides.max_tokens.map(i64::from))?
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        // Handle missing field errors specially
        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                // Every required field lives in the provider table
                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    // Extract field name from error message "missing field `api_key`"
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches('`');
                    let env_var = to_env_var(&format!("provider.{}", field));
                    Err(ConfigError::MissingEnvVar { env_var })
                } else if let config::ConfigError::NotFound(field) = &err {
                    let env_var = to_env_var(field);
                    Err(ConfigError::MissingEnvVar { env_var })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

fn default_anthropic_host() -> String {
    ANTHROPIC_HOST.to_string()
}

fn default_anthropic_model() -> String {
    ANTHROPIC_MODEL.to_string()
}

fn default_openai_host() -> String {
    OPENAI_HOST.to_string()
}

fn default_openai_model() -> String {
    OPENAI_MODEL.to_string()
}

fn default_max_tokens() -> Option<i32> {
    Some(DEFAULT_MAX_TOKENS)
}

fn default_author_name() -> String {
    Author::default().name
}

fn default_author_email() -> String {
    Author::default().email
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("WRENCH_") {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();
        env::set_var("WRENCH_PROVIDER__API_KEY", "test-key");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.provider.provider_type(), ProviderType::Anthropic);
        if let ProviderSettings::Anthropic {
            host,
            api_key,
            model,
            temperature,
            max_tokens,
        } = settings.provider
        {
            assert_eq!(host, "https://api.anthropic.com");
            assert_eq!(api_key, "test-key");
            assert_eq!(model, "claude-3-7-sonnet-latest");
            assert_eq!(temperature, None);
            assert_eq!(max_tokens, Some(1024));
        } else {
            panic!("Expected Anthropic provider");
        }
        assert_eq!(settings.git.author(), Author::default());

        clean_env();
    }

    #[test]
    #[serial]
    fn test_openai_settings() {
        clean_env();
        env::set_var("WRENCH_PROVIDER__TYPE", "openai");
        env::set_var("WRENCH_PROVIDER__API_KEY", "sk-test");
        env::set_var("WRENCH_PROVIDER__HOST", "https://proxy.example.com");
        env::set_var("WRENCH_PROVIDER__TEMPERATURE", "0.7");
        env::set_var("WRENCH_PROVIDER__MAX_TOKENS", "2000");

        let settings = Settings::new().unwrap();
        if let ProviderSettings::OpenAi {
            host,
            api_key,
            model,
            temperature,
            max_tokens,
        } = settings.provider
        {
            assert_eq!(host, "https://proxy.example.com");
            assert_eq!(api_key, "sk-test");
            assert_eq!(model, "gpt-4o");
            assert_eq!(temperature, Some(0.7));
            assert_eq!(max_tokens, Some(2000));
        } else {
            panic!("Expected OpenAI provider");
        }

        clean_env();
    }

    #[test]
    #[serial]
    fn test_missing_api_key() {
        clean_env();

        let err = Settings::new().unwrap_err();
        match err {
            ConfigError::MissingEnvVar { env_var } => {
                assert_eq!(env_var, "WRENCH_PROVIDER__API_KEY")
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_cli_overrides_win() {
        clean_env();
        env::set_var("WRENCH_PROVIDER__API_KEY", "test-key");
        env::set_var("WRENCH_PROVIDER__MODEL", "claude-3-5-haiku-latest");

        let overrides = CliOverrides {
            provider: Some("openai".to_string()),
            model: Some("gpt-4o-mini".to_string()),
            max_tokens: Some(4096),
        };
        let settings = Settings::with_overrides(&overrides).unwrap();
        assert_eq!(settings.provider.provider_type(), ProviderType::OpenAi);
        assert_eq!(settings.provider.model(), "gpt-4o-mini");

        match settings.provider.into_config() {
            ProviderConfig::OpenAi(config) => {
                assert_eq!(config.max_tokens, Some(4096));
                assert_eq!(config.host, "https://api.openai.com");
            }
            other => panic!("unexpected config {:?}", other),
        }

        clean_env();
    }

    #[test]
    #[serial]
    fn test_git_author_settings() {
        clean_env();
        env::set_var("WRENCH_PROVIDER__API_KEY", "test-key");
        env::set_var("WRENCH_GIT__AUTHOR_NAME", "Release Bot");
        env::set_var("WRENCH_GIT__AUTHOR_EMAIL", "bot@example.com");

        let settings = Settings::new().unwrap();
        assert_eq!(
            settings.git.author(),
            Author {
                name: "Release Bot".to_string(),
                email: "bot@example.com".to_string(),
            }
        );

        clean_env();
    }
}
