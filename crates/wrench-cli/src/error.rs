use thiserror::Error;

pub const ENV_PREFIX: &str = "WRENCH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },
    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Map a dotted configuration key to the environment variable that sets it,
/// e.g. `provider.api_key` becomes `WRENCH_PROVIDER__API_KEY`
pub fn to_env_var(field_path: &str) -> String {
    let key = field_path
        .split('.')
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join("__");
    format!("{}_{}", ENV_PREFIX, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_env_var() {
        assert_eq!(to_env_var("provider.api_key"), "WRENCH_PROVIDER__API_KEY");
        assert_eq!(to_env_var("git.author_name"), "WRENCH_GIT__AUTHOR_NAME");
        assert_eq!(to_env_var("type"), "WRENCH_TYPE");
    }

    #[test]
    fn test_missing_env_var_display() {
        let err = ConfigError::MissingEnvVar {
            env_var: "WRENCH_PROVIDER__API_KEY".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: WRENCH_PROVIDER__API_KEY"
        );
    }
}
