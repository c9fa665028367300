use events_agent::{AgentError, LanguageModel, ModelConfig, OllamaClient};

#[tokio::test]
async fn test_ollama_client_instantiation() {
    let client = OllamaClient::from_config(&ModelConfig::default()).unwrap();
    assert_eq!(client.model(), "llama3.2:3b");
    // Verify it implements LanguageModel trait (by creating a trait object)
    let _: Box<dyn LanguageModel> = Box::new(client);
}

#[test]
fn test_unknown_provider_is_rejected() {
    let cfg = ModelConfig {
        provider: "bedrock".into(),
        ..ModelConfig::default()
    };
    assert!(matches!(
        OllamaClient::from_config(&cfg),
        Err(AgentError::UnsupportedProvider(_))
    ));
}
