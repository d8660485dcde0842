//! Wire-level tests for the Gemini client against a local mock server.

use gistsmith::genai::{GenAiError, GeminiClient, TextGenerator};
use httpmock::prelude::*;
use serde_json::json;
use url::Url;

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new("test-key")
        .with_model("gemini-2.0-flash")
        .with_base_url(Url::parse(&server.base_url()).unwrap())
}

#[tokio::test]
async fn generate_posts_prompt_and_returns_candidate_text() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.0-flash:generateContent")
                .query_param("key", "test-key")
                .json_body_partial(
                    json!({
                        "contents": [{
                            "role": "user",
                            "parts": [{"text": "Summarize this."}]
                        }]
                    })
                    .to_string(),
                );
            then.status(200).json_body(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{"text": "A concise summary."}]
                    },
                    "finishReason": "STOP"
                }]
            }));
        })
        .await;

    let text = client_for(&server)
        .generate("Summarize this.")
        .await
        .unwrap();

    assert_eq!(text, "A concise summary.");
    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_is_a_transport_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.0-flash:generateContent");
            then.status(429).json_body(json!({
                "error": {"message": "quota exhausted"}
            }));
        })
        .await;

    let err = client_for(&server)
        .generate("anything")
        .await
        .unwrap_err();

    assert!(matches!(err, GenAiError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn response_without_text_is_an_empty_response_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.0-flash:generateContent");
            then.status(200).json_body(json!({
                "candidates": []
            }));
        })
        .await;

    let err = client_for(&server)
        .generate("anything")
        .await
        .unwrap_err();

    assert!(matches!(err, GenAiError::EmptyResponse), "{err:?}");
}
