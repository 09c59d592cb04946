use crate::converters::gemini::GeminiGenerationConfig;
use crate::converters::normalizer::RolePolicy;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    pub model: String,
    /// Takes precedence over `api_key_env` when set.
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub role_policy: RolePolicy,
    /// Include internal error messages in responses. Leave off in production.
    pub expose_error_details: bool,
    /// Request body cap; base64 images make bodies large. Read at startup only.
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            temperature: 0.7,
            max_output_tokens: 2000,
            role_policy: RolePolicy::Skip,
            expose_error_details: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config.with_env_api_key())
    }

    /// Defaults plus whatever credential the environment provides.
    pub fn from_env() -> Self {
        Config::default().with_env_api_key()
    }

    fn with_env_api_key(self) -> Self {
        self.resolve_api_key(|name| std::env::var(name).ok())
    }

    /// Fills `api_key` from `lookup(api_key_env)` unless already set.
    /// Blank keys count as missing.
    pub fn resolve_api_key(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let configured = self.api_key.take().filter(|k| !k.trim().is_empty());
        self.api_key = configured.or_else(|| lookup(&self.api_key_env).filter(|k| !k.trim().is_empty()));
        self
    }

    pub fn generation_config(&self) -> GeminiGenerationConfig {
        GeminiGenerationConfig {
            temperature: Some(self.temperature),
            max_output_tokens: Some(self.max_output_tokens),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.role_policy, RolePolicy::Skip);
        assert_eq!(config.max_body_bytes, 20 * 1024 * 1024);
        let gen_config = config.generation_config();
        assert_eq!(gen_config.temperature, Some(0.7));
        assert_eq!(gen_config.max_output_tokens, Some(2000));
    }

    #[test]
    fn test_from_file_partial_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "model: gemini-2.0-flash\napi_key: file-key\nrole_policy: reject\nmax_output_tokens: 512\nmax_body_bytes: 1048576"
        )
        .unwrap();
        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.role_policy, RolePolicy::Reject);
        assert_eq!(config.max_output_tokens, 512);
        assert_eq!(config.max_body_bytes, 1048576);
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_from_file_invalid_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "role_policy: sometimes").unwrap();
        assert!(Config::from_file(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_resolve_api_key() {
        let env = |name: &str| (name == "GROQ_API_KEY").then(|| "env-key".to_string());

        let config = Config { api_key_env: "GROQ_API_KEY".to_string(), ..Config::default() };
        assert_eq!(config.resolve_api_key(env).api_key.as_deref(), Some("env-key"));

        let config = Config { api_key: Some("file-key".to_string()), ..Config::default() };
        assert_eq!(config.resolve_api_key(|_| Some("env-key".to_string())).api_key.as_deref(), Some("file-key"));

        let config = Config { api_key: Some("  ".to_string()), ..Config::default() };
        assert!(config.resolve_api_key(|_| None).api_key.is_none());

        assert!(Config::default().resolve_api_key(env).api_key.is_none());
    }
}
