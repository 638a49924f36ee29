/// Backend selection and credentials, resolved once at construction and
/// passed explicitly to the engine. No ambient lookups inside analyzers.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub enabled: bool,
    pub provider: String,
    pub model: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: "mistral".into(),
            model: default_model("mistral"),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    pub fn from_env() -> Self {
        let provider = std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "mistral".into());
        let api_key = std::env::var("LLM_API_KEY")
            .ok()
            .or_else(|| provider_api_key(&provider))
            .unwrap_or_default();

        Self {
            enabled: parse_bool("LLM_ENABLED", true),
            model: std::env::var("LLM_MODEL").unwrap_or_else(|_| default_model(&provider)),
            api_key,
            timeout_secs: parse_u64("LLM_TIMEOUT_SECONDS", 30),
            provider,
        }
    }

    /// A deliberately backend-less configuration; the engine runs its
    /// deterministic fallback path.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

pub fn default_model(provider: &str) -> String {
    match provider.to_ascii_lowercase().as_str() {
        "claude" => "claude-3-5-sonnet-20241022".into(),
        "openai" => "gpt-3.5-turbo".into(),
        _ => "mistral-large-latest".into(),
    }
}

/// Credentials follow the `<NAME>_API_KEY` convention; `claude` also accepts
/// the vendor's own `ANTHROPIC_API_KEY`.
fn provider_api_key(provider: &str) -> Option<String> {
    match provider.to_ascii_lowercase().as_str() {
        "mistral" => std::env::var("MISTRAL_API_KEY").ok(),
        "claude" => std::env::var("CLAUDE_API_KEY")
            .ok()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok()),
        "openai" => std::env::var("OPENAI_API_KEY").ok(),
        other => std::env::var(super::credential_env_key(other)).ok(),
    }
}

pub(crate) fn parse_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

pub(crate) fn parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_env(vars: &[(&str, Option<&str>)], f: impl FnOnce()) {
        use std::sync::Mutex;
        static ENV_GUARD: Mutex<()> = Mutex::new(());
        let _guard = ENV_GUARD.lock().unwrap();

        let prev: Vec<(String, Option<String>)> = vars
            .iter()
            .map(|(key, value)| {
                let previous = std::env::var(key).ok();
                match value {
                    Some(v) => std::env::set_var(key, v),
                    None => std::env::remove_var(key),
                }
                (key.to_string(), previous)
            })
            .collect();

        f();

        for (key, previous) in prev {
            if let Some(v) = previous {
                std::env::set_var(&key, v);
            } else {
                std::env::remove_var(&key);
            }
        }
    }

    #[test]
    fn provider_specific_api_keys_fill_default() {
        with_env(
            &[
                ("LLM_PROVIDER", Some("claude")),
                ("LLM_API_KEY", None),
                ("CLAUDE_API_KEY", Some("claude-secret")),
                ("ANTHROPIC_API_KEY", None),
            ],
            || {
                let cfg = BackendConfig::from_env();
                assert_eq!(cfg.provider, "claude");
                assert_eq!(cfg.api_key, "claude-secret");
                assert_eq!(cfg.model, "claude-3-5-sonnet-20241022");
            },
        );
    }

    #[test]
    fn anthropic_key_accepted_as_claude_alias() {
        with_env(
            &[
                ("LLM_PROVIDER", Some("claude")),
                ("LLM_API_KEY", None),
                ("CLAUDE_API_KEY", None),
                ("ANTHROPIC_API_KEY", Some("vendor-secret")),
            ],
            || {
                let cfg = BackendConfig::from_env();
                assert_eq!(cfg.api_key, "vendor-secret");
            },
        );
    }

    #[test]
    fn generic_key_takes_precedence() {
        with_env(
            &[
                ("LLM_PROVIDER", Some("openai")),
                ("LLM_API_KEY", Some("generic")),
                ("OPENAI_API_KEY", Some("specific")),
            ],
            || {
                let cfg = BackendConfig::from_env();
                assert_eq!(cfg.api_key, "generic");
            },
        );
    }

    #[test]
    fn reads_env_overrides() {
        with_env(
            &[
                ("LLM_ENABLED", Some("0")),
                ("LLM_PROVIDER", Some("openai")),
                ("LLM_MODEL", Some("gpt-4o-mini")),
                ("LLM_API_KEY", Some("key")),
                ("LLM_TIMEOUT_SECONDS", Some("45")),
            ],
            || {
                let cfg = BackendConfig::from_env();
                assert!(!cfg.enabled);
                assert_eq!(cfg.provider, "openai");
                assert_eq!(cfg.model, "gpt-4o-mini");
                assert_eq!(cfg.timeout_secs, 45);
            },
        );
    }

    #[test]
    fn defaults_follow_provider() {
        with_env(
            &[
                ("LLM_PROVIDER", Some("openai")),
                ("LLM_MODEL", None),
                ("LLM_API_KEY", Some("key")),
            ],
            || {
                let cfg = BackendConfig::from_env();
                assert_eq!(cfg.model, "gpt-3.5-turbo");
                assert_eq!(cfg.timeout_secs, 30);
            },
        );
    }
}
