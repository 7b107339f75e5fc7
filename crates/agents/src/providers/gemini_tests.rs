use super::*;
use crate::provider::ChatMessage;

#[test]
fn system_instruction_is_set_only_when_present() {
    let provider = GeminiProvider::new("key", 0.5, 1.5);
    let without_system =
    provider.build_body(&ChatRequest { model: "gemini-2.0".into(), messages: vec![ChatMessage { role: ChatRole::User, content: "hi".into() }] });
    assert!(without_system.get("systemInstruction").is_none());

    let with_system = provider.build_body(&ChatRequest {
            model: "gemini-2.0".into(),
            messages: vec![
                ChatMessage { role: ChatRole::System, content: "be terse".into() },
                ChatMessage { role: ChatRole::User, content: "hi".into() },
            ],
    });
    assert_eq!(with_system["systemInstruction"]["parts"][0]["text"], "be terse");
}

#[test]
fn assistant_role_maps_to_model() {
    let provider = GeminiProvider::new("key", 0.5, 1.5);
    let body = provider.build_body(&ChatRequest {
            model: "gemini-2.0".into(),
            messages: vec![ChatMessage { role: ChatRole::Assistant, content: "ok".into() }],
    });
    assert_eq!(body["contents"][0]["role"], "model");
}
