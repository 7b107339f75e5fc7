use super::*;

#[test]
fn local_provider_has_no_cost_and_a_concurrency_limit() {
    let provider = OpenAiCompatibleProvider::local("local", "http://127.0.0.1:11434/v1");
    assert_eq!(provider.id(), "local");
    assert!(provider.capabilities().supports_async);
    assert_eq!(provider.model_info("llama3").input_price_per_m, 0.0);
}

#[test]
fn hosted_provider_carries_pricing_and_requires_a_key() {
    let provider =
    OpenAiCompatibleProvider::hosted("openai", "https://api.openai.com/v1", "sk-test", 2.0, 8.0);
    assert_eq!(provider.api_key.as_deref(), Some("sk-test"));
    let info = provider.model_info("gpt-5.2");
    assert_eq!(info.input_price_per_m, 2.0);
    assert_eq!(info.output_price_per_m, 8.0);
}

#[test]
fn role_str_maps_every_variant() {
    assert_eq!(role_str(ChatRole::System), "system");
    assert_eq!(role_str(ChatRole::User), "user");
    assert_eq!(role_str(ChatRole::Assistant), "assistant");
}
