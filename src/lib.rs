//! A tool-calling agent that answers questions about New Hampshire events.
//!
//! The crate provides:
//! - A language model abstraction (`LanguageModel`) with an Ollama client.
//! - A tool interface (`Tool`, `ToolSpec`, `ToolRegistry`) whose boundary
//!   never fails: tool errors reach the model as observation text.
//! - Two tools: the current local time and a Visit NH events lookup.
//! - An `Agent` that loops between the model and tools.

mod agent;
mod config;
mod error;
mod llm;
mod memory;
mod message;
mod prompt;
mod tool;

pub mod telemetry;
pub mod tools;

pub use agent::Agent;
pub use config::{AgentSettings, AppConfig, ModelConfig};
pub use error::{AgentError, Result};
pub use llm::{LanguageModel, ModelCompletion, OllamaClient, StubModel};
pub use memory::ConversationMemory;
pub use message::{Message, Role, ToolInvocation, ToolResult};
pub use prompt::{DEFAULT_QUESTION, SYSTEM_PROMPT};
pub use tool::{ParamType, Tool, ToolParameter, ToolRegistry, ToolSpec};
pub use tools::{events_toolkit, ClockTool, EventRecord, EventsConfig, EventsLookupTool};
