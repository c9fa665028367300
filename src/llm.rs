//! Language model implementations and abstractions.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::ModelConfig;
use crate::error::{AgentError, Result};
use crate::message::{Message, Role, ToolInvocation};
use crate::tool::ToolSpec;

/// Result of a chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelCompletion {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolInvocation>,
}

/// Minimal abstraction around a chat completion provider.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete_chat(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<ModelCompletion>;
}

fn coalesce_error(status: reqwest::StatusCode, body: &str, provider: &str) -> AgentError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return AgentError::LanguageModel(format!("{provider} rate limit exceeded: {body}"));
    }
    AgentError::LanguageModel(format!("{provider} request failed with {}: {body}", status))
}

// ─────────────────────────────────────────────────────────────────────────────
// Ollama Client (Local LLM)
// ─────────────────────────────────────────────────────────────────────────────

pub const OLLAMA_PROVIDER: &str = "ollama";
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Ollama client for local LLM inference.
#[derive(Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
}

impl OllamaClient {
    pub fn from_config(cfg: &ModelConfig) -> Result<Self> {
        if !cfg.provider.eq_ignore_ascii_case(OLLAMA_PROVIDER) {
            return Err(AgentError::UnsupportedProvider(cfg.provider.clone()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|err| AgentError::LanguageModel(format!("http client error: {err}")))?;
        Ok(Self {
            http,
            model: cfg.model.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn to_ollama_messages(&self, messages: &[Message]) -> Vec<Value> {
        messages
            .iter()
            .map(|m| {
                if let Some(call) = &m.tool_call {
                    return json!({
                        "role": Role::Assistant.as_str(),
                        "content": "",
                        "tool_calls": [{
                            "function": {"name": call.name, "arguments": call.arguments}
                        }],
                    });
                }
                let mut message = json!({
                    "role": m.role.as_str(),
                    "content": m.content,
                });
                if let Some(result) = &m.tool_result {
                    message["tool_name"] = json!(result.name);
                }
                message
            })
            .collect()
    }

    fn to_ollama_tools(&self, tools: &[ToolSpec]) -> Vec<Value> {
        tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.json_schema(),
                    }
                })
            })
            .collect()
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn complete_chat(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<ModelCompletion> {
        let mut body = json!({
            "model": self.model,
            "messages": self.to_ollama_messages(messages),
            "stream": false,
            "options": {
                "temperature": self.temperature,
                "num_predict": self.max_tokens,
            },
        });
        if !tools.is_empty() {
            body["tools"] = json!(self.to_ollama_tools(tools));
        }

        let resp = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::LanguageModel(format!("Ollama request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(coalesce_error(status, &body, "Ollama"));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| AgentError::LanguageModel(format!("Ollama parse error: {e}")))?;

        let message = &json["message"];
        let content = message["content"].as_str().map(String::from);

        let mut tool_calls = Vec::new();
        if let Some(calls) = message["tool_calls"].as_array() {
            for call in calls {
                let func = &call["function"];
                let name = func["name"].as_str().unwrap_or("").to_string();
                tool_calls.push(ToolInvocation {
                    id: call["id"].as_str().map(String::from),
                    name,
                    arguments: decode_arguments(&func["arguments"]),
                });
            }
        }

        Ok(ModelCompletion { content, tool_calls })
    }
}

// Some models send arguments as a JSON-encoded string instead of an object.
// A string that does not decode is passed through untouched so the registry
// rejects it as an observation instead of ending the run.
fn decode_arguments(raw: &Value) -> Value {
    match raw {
        Value::String(encoded) if encoded.trim().is_empty() => json!({}),
        Value::String(encoded) => serde_json::from_str(encoded).unwrap_or_else(|err| {
            tracing::warn!(arguments = %encoded, error = %err, "tool arguments are not valid JSON");
            raw.clone()
        }),
        Value::Null => json!({}),
        other => other.clone(),
    }
}

/// A deterministic model used for tests and demos.
pub struct StubModel {
    responses: Mutex<VecDeque<String>>,
}

impl StubModel {
    pub fn new(responses: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
        })
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum StubDirective {
    Respond { content: String },
    CallTool { name: String, arguments: Value },
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn complete_chat(&self, _messages: &[Message], _tools: &[ToolSpec]) -> Result<ModelCompletion> {
        let raw = {
            let mut locked = self
                .responses
                .lock()
                .map_err(|_| AgentError::LanguageModel("StubModel lock poisoned".into()))?;
            locked.pop_front().ok_or_else(|| {
                AgentError::LanguageModel("StubModel ran out of scripted responses".into())
            })?
        };

        match serde_json::from_str::<StubDirective>(&raw) {
            Ok(StubDirective::Respond { content }) => Ok(ModelCompletion {
                content: Some(content),
                tool_calls: Vec::new(),
            }),
            Ok(StubDirective::CallTool { name, arguments }) => Ok(ModelCompletion {
                content: None,
                tool_calls: vec![ToolInvocation::new(name, arguments)],
            }),
            Err(_) => Ok(ModelCompletion {
                content: Some(raw),
                tool_calls: Vec::new(),
            }),
        }
    }
}
