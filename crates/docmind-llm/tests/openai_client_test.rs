use docmind_llm::{ChatClient, ChatOptions, ChatRequest, Message, OpenAIClient, StreamEvent};
use futures::StreamExt;

fn request() -> ChatRequest {
    ChatRequest::new("test-model", vec![Message::human("What is Laredo?")])
        .with_options(ChatOptions::new().temperature(0.0))
}

#[tokio::test]
async fn test_chat_parses_completion() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": "chatcmpl-1",
                "model": "test-model",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "An app."}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
            }"#,
        )
        .create_async()
        .await;

    let client = OpenAIClient::new("test-key").unwrap().with_base_url(server.url());
    let response = client.chat(request()).await.unwrap();

    assert_eq!(response.text_or_empty(), "An app.");
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    assert_eq!(response.usage.unwrap().total_tokens, 7);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_chat_surfaces_http_errors() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body(r#"{"error":{"message":"rate limited"}}"#)
        .create_async()
        .await;

    let client = OpenAIClient::new("k").unwrap().with_base_url(server.url());
    let err = client.chat(request()).await.unwrap_err();

    let message = err.to_string();
    assert!(message.contains("429"));
    assert!(message.contains("rate limited"));
}

#[tokio::test]
async fn test_chat_stream_yields_tokens_in_order() {
    let body = concat!(
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Lare\"},\"finish_reason\":null}]}\n\n",
        ": keep-alive\n\n",
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"do\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    );

    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .match_body(mockito::Matcher::PartialJsonString(
            r#"{"stream": true}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let client = OpenAIClient::new("k").unwrap().with_base_url(server.url());
    let stream = client.chat_stream(request()).await.unwrap();
    let events: Vec<StreamEvent> = stream.map(|e| e.unwrap()).collect().await;

    assert_eq!(
        events,
        vec![
            StreamEvent::Message { content: "Lare".to_string() },
            StreamEvent::Message { content: "do".to_string() },
            StreamEvent::Done { finish_reason: Some("stop".to_string()) },
            StreamEvent::Done { finish_reason: None },
        ]
    );
}
