use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{AgentError, Result};
use crate::message::{ToolInvocation, ToolResult};

/// A named callable the agent may invoke.
///
/// Implementations return plain text: the model reads it as an observation.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    /// Declared inputs, in the order they should be presented to the model.
    fn parameters(&self) -> Vec<ToolParameter> {
        Vec::new()
    }

    async fn call(&self, input: Value) -> Result<String>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Object => "object",
            ParamType::Array => "array",
        }
    }
}

/// One declared tool input. Parameters without a default are required.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub kind: ParamType,
    pub description: String,
    #[serde(default)]
    pub default: Option<Value>,
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, kind: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Static description of a tool that can be embedded in prompts or sent to a provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

impl ToolSpec {
    /// JSON-Schema object for the parameters; `required` keeps declaration order.
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.parameters {
            let mut property = json!({
                "type": param.kind.as_str(),
                "description": param.description,
            });
            if let Some(default) = &param.default {
                property["default"] = default.clone();
            }
            properties.insert(param.name.clone(), property);
            if param.is_required() {
                required.push(Value::String(param.name.clone()));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Fill in declared defaults for absent (or null) arguments.
    pub fn apply_defaults(&self, input: Value) -> Result<Value> {
        let mut args = match input {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            other => {
                return Err(AgentError::InvalidArguments {
                    tool: self.name.clone(),
                    reason: format!("expected a JSON object, got `{other}`"),
                })
            }
        };
        for param in &self.parameters {
            let Some(default) = &param.default else {
                continue;
            };
            let missing = args.get(&param.name).map_or(true, Value::is_null);
            if missing {
                args.insert(param.name.clone(), default.clone());
            }
        }
        Ok(Value::Object(args))
    }
}

#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(AgentError::DuplicateTool(name));
        }
        self.tools.insert(name, Arc::new(tool));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn describe(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self
            .tools
            .values()
            .map(|tool| spec_of(tool.as_ref()))
            .collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Run a tool by name. Errors propagate to the caller.
    pub async fn call(&self, name: &str, input: Value) -> Result<String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;
        let input = spec_of(tool.as_ref()).apply_defaults(input)?;
        tool.call(input).await.map_err(|source| match source {
            err @ AgentError::InvalidArguments { .. } => err,
            other => AgentError::ToolInvocation {
                name: name.to_string(),
                source: Box::new(other),
            },
        })
    }

    /// Run a tool on behalf of the model. Never fails: errors become the
    /// observation text of the returned result.
    pub async fn invoke(&self, invocation: &ToolInvocation) -> ToolResult {
        tracing::debug!(
            tool = %invocation.name,
            arguments = %invocation.arguments,
            "tool invoked"
        );
        let (output, is_error) = match self
            .call(&invocation.name, invocation.arguments.clone())
            .await
        {
            Ok(output) => (output, false),
            Err(err) => {
                tracing::warn!(tool = %invocation.name, error = %err, "tool failed");
                (format!("Error: {err}"), true)
            }
        };
        tracing::debug!(tool = %invocation.name, is_error, result = %output, "tool returned");
        ToolResult {
            name: invocation.name.clone(),
            tool_call_id: invocation.id.clone(),
            output,
            is_error,
        }
    }
}

fn spec_of(tool: &dyn Tool) -> ToolSpec {
    ToolSpec {
        name: tool.name().to_string(),
        description: tool.description().to_string(),
        parameters: tool.parameters(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct First;
    struct Paged;
    struct Failing;

    #[async_trait]
    impl Tool for First {
        fn name(&self) -> &str {
            "a_first"
        }

        fn description(&self) -> &str {
            "First tool"
        }

        async fn call(&self, _input: Value) -> Result<String> {
            Ok("first".into())
        }
    }

    #[async_trait]
    impl Tool for Paged {
        fn name(&self) -> &str {
            "paged"
        }

        fn description(&self) -> &str {
            "Echoes the requested page"
        }

        fn parameters(&self) -> Vec<ToolParameter> {
            vec![
                ToolParameter::new("query", ParamType::String, "What to look up"),
                ToolParameter::new("page", ParamType::Integer, "Page to fetch")
                    .with_default(json!(1)),
            ]
        }

        async fn call(&self, input: Value) -> Result<String> {
            Ok(format!("{} page {}", input["query"].as_str().unwrap_or(""), input["page"]))
        }
    }

    #[async_trait]
    impl Tool for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        async fn call(&self, _input: Value) -> Result<String> {
            Err(AgentError::Protocol("boom".into()))
        }
    }

    #[tokio::test]
    async fn returns_sorted_descriptions() {
        let mut registry = ToolRegistry::new();
        registry.register(Paged).unwrap();
        registry.register(First).unwrap();

        let names: Vec<String> = registry.describe().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["a_first", "paged"]);
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut registry = ToolRegistry::new();
        registry.register(First).unwrap();

        let err = registry.register(First).unwrap_err();
        assert!(matches!(err, AgentError::DuplicateTool(name) if name == "a_first"));
    }

    #[test]
    fn schema_lists_required_parameters_in_order() {
        let spec = spec_of(&Paged);
        let schema = spec.json_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["query"]));
        assert_eq!(schema["properties"]["page"]["default"], json!(1));
        assert_eq!(schema["properties"]["query"]["type"], "string");
        let names: Vec<&str> = spec.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["query", "page"]);
    }

    #[tokio::test]
    async fn fills_defaults_before_calling() {
        let mut registry = ToolRegistry::new();
        registry.register(Paged).unwrap();

        let output = registry.call("paged", json!({"query": "fairs"})).await.unwrap();
        assert_eq!(output, "fairs page 1");

        let output = registry
            .call("paged", json!({"query": "fairs", "page": 3}))
            .await
            .unwrap();
        assert_eq!(output, "fairs page 3");
    }

    #[tokio::test]
    async fn invoke_collapses_errors_into_text() {
        let mut registry = ToolRegistry::new();
        registry.register(Failing).unwrap();

        let missing = registry
            .invoke(&ToolInvocation::new("nope", Value::Null))
            .await;
        assert!(missing.is_error);
        assert_eq!(missing.output, "Error: tool `nope` not found");

        let failed = registry
            .invoke(&ToolInvocation::new("failing", json!({})))
            .await;
        assert!(failed.is_error);
        assert!(failed.output.starts_with("Error: tool `failing` invocation failed"));
        assert!(failed.output.contains("boom"));
    }

    #[tokio::test]
    async fn invoke_rejects_non_object_arguments() {
        let mut registry = ToolRegistry::new();
        registry.register(Paged).unwrap();

        let result = registry
            .invoke(&ToolInvocation::new("paged", json!("fairs")))
            .await;
        assert!(result.is_error);
        assert!(result.output.contains("invalid arguments for `paged`"));
    }
}
