use rptqa_llm::{
    Completion, CompletionOptions, CompletionRequest, LlmClient, LlmError, LlmProvider,
};

#[test]
fn provider_names_round_trip() {
    for provider in [LlmProvider::OpenAi, LlmProvider::Anthropic, LlmProvider::Local] {
        assert_eq!(LlmProvider::from_str(provider.as_str()), Some(provider));
    }
    assert_eq!(LlmProvider::from_str("OpenAI"), Some(LlmProvider::OpenAi));
    assert_eq!(LlmProvider::from_str("cohere"), None);
}

#[test]
fn default_options_are_low_randomness_and_bounded() {
    let options = CompletionOptions::default();
    assert!(options.temperature <= 0.2);
    assert_eq!(options.max_tokens, 1000);
    assert!(options.timeout.as_secs() >= 1);
}

#[test]
fn missing_credential_is_detected_up_front() {
    // The OpenAI constructor reads the key eagerly, so an absent credential
    // is visible before any completion is attempted.
    std::env::remove_var("OPENAI_API_KEY");
    let result = LlmClient::new(LlmProvider::OpenAi, "gpt-4o");
    assert!(matches!(result, Err(LlmError::Unconfigured("OPENAI_API_KEY"))));
}

#[tokio::test]
async fn local_provider_answers_without_network() {
    let client = LlmClient::new(LlmProvider::Local, "local").expect("local needs no key");
    let response = client
        .complete(
            &CompletionRequest {
                system: None,
                user: "Which tables feed the Details section?".to_string(),
            },
            &CompletionOptions::default(),
        )
        .await
        .expect("local completion");
    assert!(response.content.contains("Details"));
    assert_eq!(response.total_tokens(), 0);
    assert_eq!(client.describe(), "local/local");
}
