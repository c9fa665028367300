use std::sync::Arc;

use tracing::Instrument;

use crate::error::{AgentError, Result};
use crate::llm::{LanguageModel, ModelCompletion};
use crate::memory::ConversationMemory;
use crate::message::Message;
use crate::tool::ToolRegistry;

/// An agent that alternates between the LLM and registered tools until the
/// model produces a plain answer.
pub struct Agent<M: LanguageModel> {
    system_prompt: String,
    model: Arc<M>,
    tools: ToolRegistry,
    memory: ConversationMemory,
    max_steps: usize,
}

impl<M: LanguageModel> Agent<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self {
            system_prompt: "You are a helpful agent.".to_string(),
            model,
            tools: ToolRegistry::new(),
            memory: ConversationMemory::default(),
            max_steps: 6,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_memory(mut self, memory: ConversationMemory) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn transcript(&self) -> &[Message] {
        self.memory.messages()
    }

    pub fn tools_mut(&mut self) -> &mut ToolRegistry {
        &mut self.tools
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Run a single exchange with the agent. Returns the final assistant reply.
    pub async fn respond(&mut self, user_input: impl Into<String>) -> Result<String> {
        self.memory.push(Message::user(user_input));
        let specs = self.tools.describe();

        for step in 1..=self.max_steps {
            let span = tracing::debug_span!("agent_step", step);
            let mut request = vec![Message::system(self.system_prompt.clone())];
            request.extend(self.memory.iter().cloned());
            let completion = self
                .model
                .complete_chat(&request, &specs)
                .instrument(span.clone())
                .await?;

            if !completion.tool_calls.is_empty() {
                for mut call in completion.tool_calls {
                    if call.id.is_none() {
                        call.id = Some(uuid::Uuid::new_v4().to_string());
                    }
                    self.memory.push(Message::tool_call(call.clone()));
                    let result = self.tools.invoke(&call).instrument(span.clone()).await;
                    self.memory.push(Message::tool(result));
                }
                continue;
            }

            match completion {
                ModelCompletion {
                    content: Some(content),
                    ..
                } => {
                    tracing::debug!(step, "model answered");
                    self.memory.push(Message::assistant(&content));
                    return Ok(content);
                }
                _ => {
                    return Err(AgentError::Protocol(
                        "Model response missing content and tool calls".into(),
                    ))
                }
            }
        }

        Err(AgentError::Protocol(
            "Agent reached the step limit without returning a response".into(),
        ))
    }
}
