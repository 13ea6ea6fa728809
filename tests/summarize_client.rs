// File: tests/summarize_client.rs
use mockito::{Matcher, Server};
use serde_json::json;
use statusly::config::OpenAiConfig;
use statusly::digest::compose;
use statusly::error::StatuslyError;
use statusly::model::AggregatedWindow;
use statusly::summarize::{OpenAiSummarizer, SYSTEM_PROMPT, Summarizer};
use std::time::Duration;

fn config(url: &str) -> OpenAiConfig {
    OpenAiConfig {
        api_key: "sk-test".to_string(),
        model: "gpt-4o-mini".to_string(),
        api_url: url.to_string(),
    }
}

fn sample_digest() -> statusly::digest::Digest {
    let mut w = AggregatedWindow::default();
    w.doing.insert("write spec".to_string());
    w.blocker.insert("blocked on review".to_string());
    compose(&w).unwrap()
}

#[tokio::test]
async fn test_summary_is_first_choice_verbatim() {
    let mut server = Server::new_async().await;
    let digest = sample_digest();

    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": digest.as_str() },
            ],
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "chatcmpl-1",
                "choices": [
                    { "index": 0, "message": { "role": "assistant", "content": "## DOING\n- write spec\n" } },
                    { "index": 1, "message": { "role": "assistant", "content": "ignored" } }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = OpenAiSummarizer::new(config(&server.url()), Duration::from_secs(5)).unwrap();
    let text = client.summarize(&digest).await.unwrap();

    mock.assert_async().await;
    assert_eq!(text, "## DOING\n- write spec\n");
}

#[tokio::test]
async fn test_missing_key_rejected_up_front() {
    let mut cfg = config("http://127.0.0.1:9");
    cfg.api_key = String::new();
    assert!(matches!(
        OpenAiSummarizer::new(cfg, Duration::from_secs(5)),
        Err(StatuslyError::MissingCredentials(_))
    ));
}

#[tokio::test]
async fn test_auth_error_is_summarization_failure() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error": {"message": "Incorrect API key provided"}}"#)
        .create_async()
        .await;

    let client = OpenAiSummarizer::new(config(&server.url()), Duration::from_secs(5)).unwrap();
    match client.summarize(&sample_digest()).await {
        Err(StatuslyError::SummarizationFailed(msg)) => assert!(msg.contains("401")),
        other => panic!("expected summarization failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_choices_is_failure() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices": []}"#)
        .create_async()
        .await;

    let client = OpenAiSummarizer::new(config(&server.url()), Duration::from_secs(5)).unwrap();
    let err = client.summarize(&sample_digest()).await.unwrap_err();
    assert!(matches!(err, StatuslyError::SummarizationFailed(_)));
}

#[tokio::test]
async fn test_malformed_body_is_failure() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body("<html>bad gateway</html>")
        .create_async()
        .await;

    let client = OpenAiSummarizer::new(config(&server.url()), Duration::from_secs(5)).unwrap();
    let err = client.summarize(&sample_digest()).await.unwrap_err();
    assert!(matches!(err, StatuslyError::SummarizationFailed(_)));
}
