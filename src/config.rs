use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::llm::{DEFAULT_OLLAMA_HOST, OLLAMA_PROVIDER};
use crate::tools::EventsConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_model_timeout(),
            max_tokens: default_max_tokens(),
            base_url: default_base_url(),
        }
    }
}

fn default_provider() -> String {
    OLLAMA_PROVIDER.into()
}

fn default_model() -> String {
    "llama3.2:3b".into()
}

fn default_temperature() -> f32 {
    0.5
}

fn default_model_timeout() -> u64 {
    30
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_base_url() -> String {
    DEFAULT_OLLAMA_HOST.into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSettings {
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
        }
    }
}

fn default_max_steps() -> usize {
    6
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub agent: AgentSettings,
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let cfg: Self = toml::from_str(&raw)
            .map_err(|err| AgentError::Config(format!("Failed to parse configuration: {err}")))?;
        Ok(cfg)
    }

    pub fn from_env_or_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut cfg = Self::from_file(path)?;
        cfg.apply_overrides(|key| env::var(key).ok());
        Ok(cfg)
    }

    /// Defaults plus environment overrides; no file involved.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_overrides(|key| env::var(key).ok());
        cfg
    }

    /// Apply `EVENTS_AGENT_*` overrides read through `lookup`.
    /// Values that fail to parse are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(provider) = lookup("EVENTS_AGENT_PROVIDER") {
            self.model.provider = provider;
        }
        if let Some(model) = lookup("EVENTS_AGENT_MODEL") {
            self.model.model = model;
        }
        if let Some(temperature) = parsed(&lookup, "EVENTS_AGENT_TEMPERATURE") {
            self.model.temperature = temperature;
        }
        if let Some(timeout) = parsed(&lookup, "EVENTS_AGENT_TIMEOUT") {
            self.model.timeout_secs = timeout;
        }
        if let Some(max_tokens) = parsed(&lookup, "EVENTS_AGENT_MAX_TOKENS") {
            self.model.max_tokens = max_tokens;
        }
        if let Some(host) = lookup("EVENTS_AGENT_OLLAMA_HOST").or_else(|| lookup("OLLAMA_HOST")) {
            self.model.base_url = host;
        }
        if let Some(endpoint) = lookup("EVENTS_AGENT_EVENTS_ENDPOINT") {
            self.events.endpoint = endpoint;
        }
        if let Some(timeout) = parsed(&lookup, "EVENTS_AGENT_EVENTS_TIMEOUT") {
            self.events.timeout_secs = timeout;
        }
        if let Some(steps) = parsed(&lookup, "EVENTS_AGENT_MAX_STEPS") {
            self.agent.max_steps = steps;
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable configuration override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_demo_setup() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.model.provider, "ollama");
        assert_eq!(cfg.model.model, "llama3.2:3b");
        assert_eq!(cfg.model.temperature, 0.5);
        assert_eq!(cfg.model.timeout_secs, 30);
        assert_eq!(cfg.model.max_tokens, 1000);
        assert_eq!(cfg.events.endpoint, "https://www.visitnh.gov/api/events/getitems");
        assert_eq!(cfg.events.timeout_secs, 10);
        assert_eq!(cfg.events.max_results, 10);
        assert_eq!(cfg.agent.max_steps, 6);
    }

    #[test]
    fn loads_partial_file_over_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[model]\nmodel='qwen2.5:7b'\ntemperature=0.1\n[events]\nendpoint='http://127.0.0.1:8080/events'"
        )
        .unwrap();

        let cfg = AppConfig::from_file(file.path()).unwrap();

        assert_eq!(cfg.model.model, "qwen2.5:7b");
        assert_eq!(cfg.model.temperature, 0.1);
        assert_eq!(cfg.model.provider, "ollama");
        assert_eq!(cfg.model.max_tokens, 1000);
        assert_eq!(cfg.events.endpoint, "http://127.0.0.1:8080/events");
        assert_eq!(cfg.events.timeout_secs, 10);
    }

    #[test]
    fn rejects_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[model\nmodel=").unwrap();

        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }

    #[test]
    fn overrides_each_field_independently() {
        let mut cfg = AppConfig::default();
        cfg.apply_overrides(lookup_from(&[
            ("EVENTS_AGENT_MODEL", "llama3.1"),
            ("EVENTS_AGENT_MAX_TOKENS", "256"),
            ("EVENTS_AGENT_EVENTS_TIMEOUT", "3"),
        ]));

        assert_eq!(cfg.model.model, "llama3.1");
        assert_eq!(cfg.model.max_tokens, 256);
        assert_eq!(cfg.events.timeout_secs, 3);
        assert_eq!(cfg.model.temperature, 0.5);
        assert_eq!(cfg.model.timeout_secs, 30);
    }

    #[test]
    fn specific_host_wins_over_ollama_host() {
        let mut cfg = AppConfig::default();
        cfg.apply_overrides(lookup_from(&[
            ("OLLAMA_HOST", "http://gpu-box:11434"),
            ("EVENTS_AGENT_OLLAMA_HOST", "http://other:11434"),
        ]));
        assert_eq!(cfg.model.base_url, "http://other:11434");

        let mut cfg = AppConfig::default();
        cfg.apply_overrides(lookup_from(&[("OLLAMA_HOST", "http://gpu-box:11434")]));
        assert_eq!(cfg.model.base_url, "http://gpu-box:11434");
    }

    #[test]
    fn ignores_unparseable_numbers() {
        let mut cfg = AppConfig::default();
        cfg.apply_overrides(lookup_from(&[
            ("EVENTS_AGENT_TEMPERATURE", "warm"),
            ("EVENTS_AGENT_MAX_STEPS", "-1"),
        ]));

        assert_eq!(cfg.model.temperature, 0.5);
        assert_eq!(cfg.agent.max_steps, 6);
    }
}
