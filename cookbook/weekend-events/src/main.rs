//! Ask the events agent one question and print its answer.
//!
//! The question is taken from the command line, falling back to
//! "what events are there this weekend?". Requires a running Ollama server.

use std::env;
use std::sync::Arc;

use events_agent::{
    events_toolkit, telemetry, Agent, AppConfig, OllamaClient, Result, DEFAULT_QUESTION,
    SYSTEM_PROMPT,
};

const CONFIG_PATH_ENV: &str = "EVENTS_AGENT_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing("info");

    let config = match env::var(CONFIG_PATH_ENV) {
        Ok(path) => AppConfig::from_env_or_file(path)?,
        Err(_) => AppConfig::from_env(),
    };

    let args: Vec<String> = env::args().skip(1).collect();
    let question = if args.is_empty() {
        DEFAULT_QUESTION.to_string()
    } else {
        args.join(" ")
    };

    tracing::info!(
        provider = %config.model.provider,
        model = %config.model.model,
        endpoint = %config.events.endpoint,
        "starting events agent"
    );

    let model = Arc::new(OllamaClient::from_config(&config.model)?);
    let tools = events_toolkit(config.events.clone())?;
    let mut agent = Agent::new(model)
        .with_system_prompt(SYSTEM_PROMPT)
        .with_tools(tools)
        .with_max_steps(config.agent.max_steps);

    let answer = agent.respond(question).await?;

    println!("\n{}", "=".repeat(50));
    println!("RESPONSE:");
    println!("{answer}");
    Ok(())
}
