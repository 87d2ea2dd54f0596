mod canned;
mod ollama;
mod openai;

use async_trait::async_trait;
use crate::config::env_non_empty;
use std::sync::Arc;
use std::time::Duration;

pub use canned::CannedProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Result type for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Response parsing failed: {0}")]
    ParseError(String),
}

/// Request to generate an answer
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Fixed instruction sent as the system message
    pub system_prompt: String,
    /// The user prompt text
    pub prompt: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum response length in tokens
    pub max_tokens: u32,
    /// Timeout for the request
    pub timeout: Duration,
}

/// Response from an LLM provider
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    /// The generated text, empty if the provider returned none
    pub text: String,
    pub metadata: ResponseMetadata,
}

/// Metadata about the LLM response
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// Name of the provider (e.g., "groq", "ollama")
    pub provider: String,
    /// Model name used
    pub model: String,
    /// Tokens consumed (if available)
    pub tokens_used: Option<u32>,
    /// Latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all LLM providers must implement
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate an answer for the given prompt
    async fn generate(&self, request: GenerateRequest) -> LlmResult<GenerateResponse>;

    /// Get the name of this provider
    fn name(&self) -> &str;
}

/// Which provider to talk to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    /// Groq's OpenAI-compatible endpoint
    Groq,
    /// OpenAI or any other OpenAI-compatible endpoint
    OpenAi,
    /// A local Ollama server
    Ollama,
    /// Offline canned answers
    Canned,
}

impl ProviderKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "groq" => Some(Self::Groq),
            "openai" => Some(Self::OpenAi),
            "ollama" => Some(Self::Ollama),
            "canned" | "mock" => Some(Self::Canned),
            _ => None,
        }
    }
}

pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-70b-versatile";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Instruction sent with every question (Portuguese, like the quiz front-end)
pub const DEFAULT_SYSTEM_PROMPT: &str = "Responda sem linguagem humana, sem expressões emocionais, \
    sem coloquialismos. Use tópicos estratégicos e técnicos.";

/// Configuration for the LLM provider
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    /// API key for Groq/OpenAI
    pub api_key: Option<String>,
    /// Override for the OpenAI-compatible base URL
    pub api_base: Option<String>,
    /// Ollama base URL
    pub ollama_base_url: String,
    /// Model to use (provider default when unset)
    pub model: Option<String>,
    pub system_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Canned,
            api_key: None,
            api_base: None,
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            model: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: 0.7,
            max_tokens: 500,
            timeout: Duration::from_secs(30),
        }
    }
}

impl LlmConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let groq_key = env_non_empty("GROQ_API_KEY");
        let openai_key = env_non_empty("OPENAI_API_KEY");

        let provider = match env_non_empty("LLM_PROVIDER") {
            Some(raw) => ProviderKind::parse(&raw).unwrap_or_else(|| {
                tracing::warn!("Unknown LLM_PROVIDER '{}', using canned answers", raw);
                ProviderKind::Canned
            }),
            None if groq_key.is_some() => ProviderKind::Groq,
            None if openai_key.is_some() => ProviderKind::OpenAi,
            None => ProviderKind::Canned,
        };

        let api_key = match provider {
            ProviderKind::Groq => groq_key,
            ProviderKind::OpenAi => openai_key,
            _ => None,
        };

        Self {
            provider,
            api_key,
            api_base: env_non_empty("LLM_API_BASE"),
            ollama_base_url: env_non_empty("OLLAMA_BASE_URL")
                .unwrap_or(defaults.ollama_base_url),
            model: env_non_empty("LLM_MODEL"),
            system_prompt: env_non_empty("LLM_SYSTEM_PROMPT").unwrap_or(defaults.system_prompt),
            temperature: env_non_empty("LLM_TEMPERATURE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.temperature),
            max_tokens: env_non_empty("LLM_MAX_TOKENS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_tokens),
            timeout: env_non_empty("LLM_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    /// Build a request for `prompt` using the configured instruction and sampling parameters
    pub fn request(&self, prompt: String) -> GenerateRequest {
        GenerateRequest {
            system_prompt: self.system_prompt.clone(),
            prompt,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: self.timeout,
        }
    }

    /// Build the configured provider
    pub fn build_provider(&self) -> LlmResult<Arc<dyn LlmProvider>> {
        let provider: Arc<dyn LlmProvider> = match self.provider {
            ProviderKind::Groq => {
                let api_key = self.api_key.clone().ok_or_else(|| {
                    LlmError::ConfigError("GROQ_API_KEY is required for the groq provider".into())
                })?;
                Arc::new(OpenAiProvider::new(
                    "groq",
                    api_key,
                    Some(
                        self.api_base
                            .clone()
                            .unwrap_or_else(|| GROQ_API_BASE.to_string()),
                    ),
                    self.model
                        .clone()
                        .unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
                ))
            }
            ProviderKind::OpenAi => {
                let api_key = self.api_key.clone().ok_or_else(|| {
                    LlmError::ConfigError(
                        "OPENAI_API_KEY is required for the openai provider".into(),
                    )
                })?;
                Arc::new(OpenAiProvider::new(
                    "openai",
                    api_key,
                    self.api_base.clone(),
                    self.model
                        .clone()
                        .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                ))
            }
            ProviderKind::Ollama => Arc::new(OllamaProvider::new(
                self.ollama_base_url.clone(),
                self.model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            )?),
            ProviderKind::Canned => {
                tracing::warn!("Using canned LLM answers; set GROQ_API_KEY for real ones");
                Arc::new(CannedProvider::new())
            }
        };

        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const LLM_VARS: &[&str] = &[
        "LLM_PROVIDER",
        "GROQ_API_KEY",
        "OPENAI_API_KEY",
        "LLM_API_BASE",
        "OLLAMA_BASE_URL",
        "LLM_MODEL",
        "LLM_SYSTEM_PROMPT",
        "LLM_TEMPERATURE",
        "LLM_MAX_TOKENS",
        "LLM_TIMEOUT",
    ];

    fn clear_env() {
        for key in LLM_VARS {
            std::env::remove_var(key);
        }
    }

    fn set_env(key: &str, value: &str) {
        std::env::set_var(key, value);
    }

    #[test]
    fn test_default_config() {
        let config = LlmConfig::default();
        assert_eq!(config.provider, ProviderKind::Canned);
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 500);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    #[serial]
    fn test_from_env_without_keys_uses_canned() {
        clear_env();
        let config = LlmConfig::from_env();
        assert_eq!(config.provider, ProviderKind::Canned);
        assert_eq!(config.build_provider().unwrap().name(), "canned");
    }

    #[test]
    #[serial]
    fn test_from_env_prefers_groq_key() {
        clear_env();
        set_env("GROQ_API_KEY", "gsk-test");
        set_env("OPENAI_API_KEY", "sk-test");
        set_env("LLM_MAX_TOKENS", "200");
        set_env("LLM_TEMPERATURE", "  ");

        let config = LlmConfig::from_env();
        assert_eq!(config.provider, ProviderKind::Groq);
        assert_eq!(config.api_key.as_deref(), Some("gsk-test"));
        assert_eq!(config.max_tokens, 200);
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.build_provider().unwrap().name(), "groq");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_explicit_provider_without_key_fails_to_build() {
        clear_env();
        set_env("LLM_PROVIDER", "openai");

        let config = LlmConfig::from_env();
        assert_eq!(config.provider, ProviderKind::OpenAi);
        assert!(matches!(
            config.build_provider(),
            Err(LlmError::ConfigError(_))
        ));
        clear_env();
    }

    #[test]
    fn test_request_carries_sampling_parameters() {
        let config = LlmConfig {
            temperature: 0.2,
            max_tokens: 64,
            ..LlmConfig::default()
        };
        let request = config.request("Qual é a capital?".to_string());
        assert_eq!(request.prompt, "Qual é a capital?");
        assert_eq!(request.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(request.temperature, 0.2);
        assert_eq!(request.max_tokens, 64);
    }
}
