use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

pub mod config;
pub mod providers;

pub use config::BackendConfig;

/// Failure talking to a generation backend. Always distinct from malformed
/// structured output, which is reported as an empty object instead.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("backend returned empty content")]
    EmptyContent,
}

/// Construction-time failure. Fatal to engine construction, never to an
/// in-flight batch.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown backend provider: {0}")]
    UnknownProvider(String),
    #[error("missing credential for provider {provider}: set {env_key}")]
    MissingCredential { provider: String, env_key: String },
}

/// Uniform capability interface over interchangeable text-generation
/// backends.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Free-text completion. Backend failures propagate to the caller;
    /// nothing is swallowed at this layer.
    async fn generate_text(&self, prompt: &str) -> Result<String, BackendError>;

    /// JSON-structured completion. The schema is advisory prompt text, not
    /// enforced by the backend.
    ///
    /// Malformed JSON is not an error here: the caller receives an empty
    /// object and applies its own fallback.
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: Option<&Value>,
    ) -> Result<Value, BackendError> {
        let response = self.generate_text(&json_prompt(prompt, schema)).await?;
        let stripped = strip_json_fences(&response);
        match serde_json::from_str(stripped) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(
                    backend = self.name(),
                    error = %err,
                    "structured response was not valid JSON; returning empty object"
                );
                Ok(Value::Object(Map::new()))
            }
        }
    }
}

/// Append the JSON-only instruction, and the advisory schema when given, to
/// a prompt.
pub fn json_prompt(prompt: &str, schema: Option<&Value>) -> String {
    let mut framed =
        format!("{prompt}\n\nYou MUST return ONLY valid JSON. No markdown, no extra text.");
    if let Some(schema) = schema {
        framed.push_str("\nSchema: ");
        framed.push_str(&serde_json::to_string_pretty(schema).unwrap_or_default());
    }
    framed
}

/// Strip the ```json ... ``` / ``` ... ``` fences some models wrap JSON in.
pub fn strip_json_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest.strip_prefix("json").unwrap_or(rest).trim_start();
        if let Some(rest) = text.strip_suffix("```") {
            text = rest.trim_end();
        }
    }
    text
}

/// Conventional credential variable for a provider name.
pub fn credential_env_key(provider: &str) -> String {
    format!("{}_API_KEY", provider.to_ascii_uppercase())
}

/// Registry keyed by provider name. Unknown names fail fast.
pub fn create_provider(config: &BackendConfig) -> Result<Box<dyn TextGenerator>, ConfigError> {
    let name = config.provider.to_ascii_lowercase();
    match name.as_str() {
        "mistral" | "claude" | "openai" if config.api_key.is_empty() => {
            Err(ConfigError::MissingCredential {
                env_key: credential_env_key(&name),
                provider: name,
            })
        }
        "mistral" => Ok(Box::new(providers::MistralProvider::new(config))),
        "claude" => Ok(Box::new(providers::ClaudeProvider::new(config))),
        "openai" => Ok(Box::new(providers::OpenAiProvider::new(config))),
        _ => Err(ConfigError::UnknownProvider(config.provider.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fences_with_json_tag() {
        let fenced = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(fenced), "{\"key\": \"value\"}");
    }

    #[test]
    fn strips_fences_without_tag() {
        let fenced = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(fenced), "{\"key\": \"value\"}");
    }

    #[test]
    fn leaves_bare_json_alone() {
        assert_eq!(strip_json_fences("{\"key\": 1}"), "{\"key\": 1}");
    }

    #[test]
    fn fenced_and_unfenced_parse_identically() {
        let bare: Value = serde_json::from_str(strip_json_fences("{\"score\": 80}")).unwrap();
        let fenced: Value =
            serde_json::from_str(strip_json_fences("```json\n{\"score\": 80}\n```")).unwrap();
        assert_eq!(bare, fenced);
    }

    #[test]
    fn json_prompt_includes_schema_when_given() {
        let schema = serde_json::json!({"type": "object"});
        let framed = json_prompt("extract", Some(&schema));
        assert!(framed.contains("ONLY valid JSON"));
        assert!(framed.contains("\"type\""));
    }

    #[test]
    fn unknown_provider_fails_construction() {
        let config = BackendConfig {
            provider: "palm".into(),
            api_key: "key".into(),
            ..BackendConfig::default()
        };
        assert!(matches!(
            create_provider(&config),
            Err(ConfigError::UnknownProvider(_))
        ));
    }

    #[test]
    fn missing_credential_fails_construction() {
        let config = BackendConfig {
            provider: "mistral".into(),
            api_key: String::new(),
            ..BackendConfig::default()
        };
        let err = create_provider(&config)
            .err()
            .expect("construction should fail");
        match err {
            ConfigError::MissingCredential { env_key, .. } => {
                assert_eq!(env_key, "MISTRAL_API_KEY");
            }
            other => panic!("expected missing credential, got {other}"),
        }
    }

    #[test]
    fn known_providers_construct() {
        for name in ["mistral", "claude", "openai"] {
            let config = BackendConfig {
                provider: name.into(),
                api_key: "secret".into(),
                ..BackendConfig::default()
            };
            let provider = create_provider(&config).expect("provider should construct");
            assert_eq!(provider.name(), name);
        }
    }
}
