use daybreak_llm::gemini::GeminiClient;
use daybreak_llm::groq::GroqClient;
use daybreak_llm::traits::LlmClient;
use daybreak_llm::xai::XaiClient;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn groq_reads_first_choice_and_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer gsk-test"))
        .and(body_partial_json(json!({
            "model": "llama-3.3-70b-versatile",
            "messages": [
                {"role": "system"},
                {"role": "user", "content": "write the post"}
            ],
            "max_tokens": 200,
            "temperature": 0.9
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "gm frens"}}],
            "model": "llama-3.3-70b-versatile",
            "usage": {"prompt_tokens": 120, "completion_tokens": 12, "total_tokens": 132}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GroqClient::new(
        "gsk-test".to_string(),
        "llama-3.3-70b-versatile".to_string(),
        Some(&server.uri()),
    )
    .unwrap();

    let resp = client
        .generate("write the post", Some("style rules"), Some(200), Some(0.9))
        .await
        .unwrap();

    assert_eq!(resp.text, "gm frens");
    assert_eq!(resp.tokens_used, Some(132));
    assert!(resp.citations.is_none());
}

#[tokio::test]
async fn groq_surfaces_api_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Invalid API Key", "type": "invalid_request_error"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GroqClient::new("bad".to_string(), "llama-3.3-70b-versatile".to_string(), Some(&server.uri())).unwrap();
    let err = client.generate("write", None, None, None).await.unwrap_err();
    assert!(err.to_string().contains("Invalid API Key"), "got: {err}");
}

#[tokio::test]
async fn xai_live_search_rides_the_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer xai-test"))
        .and(body_partial_json(json!({
            "search_parameters": {
                "mode": "on",
                "sources": [{"type": "x"}],
                "max_search_results": 5,
                "return_citations": true
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "gm, the timeline is wild today"}}],
            "model": "grok-3",
            "citations": ["https://x.com/a/status/1", "https://x.com/b/status/2"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = XaiClient::new("xai-test".to_string(), "grok-3".to_string(), Some(&server.uri()))
        .unwrap()
        .with_live_search(true, Some(5));

    let resp = client.generate("write it", None, None, None).await.unwrap();
    assert_eq!(resp.text, "gm, the timeline is wild today");
    assert_eq!(resp.citations.as_ref().map(Vec::len), Some(2));
}

#[tokio::test]
async fn xai_omits_search_parameters_when_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "gm"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        XaiClient::new("xai-test".to_string(), "grok-3".to_string(), Some(&server.uri())).unwrap();
    let resp = client.generate("write it", None, None, None).await.unwrap();
    assert_eq!(resp.text, "gm");
    assert!(resp.citations.is_none());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("search_parameters").is_none());
    assert!(body.get("max_tokens").is_none());
}

#[tokio::test]
async fn gemini_keys_via_query_and_reads_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(query_param("key", "g-test"))
        .and(body_partial_json(json!({
            "contents": [{"parts": [{"text": "write the post"}]}],
            "system_instruction": {"parts": [{"text": "style rules"}]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"parts": [{"text": "gm, slow sunday vibes"}], "role": "model"},
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 80,
                "candidatesTokenCount": 14,
                "totalTokenCount": 94
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(
        "g-test".to_string(),
        "gemini-2.0-flash".to_string(),
        Some(&server.uri()),
    )
    .unwrap();

    let resp = client
        .generate("write the post", Some("style rules"), Some(200), Some(0.9))
        .await
        .unwrap();

    assert_eq!(resp.text, "gm, slow sunday vibes");
    assert_eq!(resp.tokens_used, Some(94));
}

#[tokio::test]
async fn gemini_safety_block_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(
        "g-test".to_string(),
        "gemini-2.0-flash".to_string(),
        Some(&server.uri()),
    )
    .unwrap();

    let err = client.generate("write", None, None, None).await.unwrap_err();
    assert!(err.to_string().contains("safety"), "got: {err}");
}

#[tokio::test]
async fn gemini_empty_candidates_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(
        "g-test".to_string(),
        "gemini-2.0-flash".to_string(),
        Some(&server.uri()),
    )
    .unwrap();

    let err = client.generate("write", None, None, None).await.unwrap_err();
    assert!(err.to_string().contains("no candidates"), "got: {err}");
}
