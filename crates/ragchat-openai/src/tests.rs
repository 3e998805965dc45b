//! HTTP tests for the OpenAI client

#[cfg(test)]
mod http_tests {
    use crate::{ChatMessage, Embedder, Error, LLMProvider, OpenAiClient, OpenAiConfig};
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> OpenAiClient {
        let config = OpenAiConfig::new("test_key").with_api_url(server.base_url());
        OpenAiClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_chat_returns_first_choice() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("Authorization", "Bearer test_key");
                then.status(200).json_body(json!({
                    "choices": [
                        { "message": { "role": "assistant", "content": "X is Y." } }
                    ],
                    "usage": { "total_tokens": 42 }
                }));
            })
            .await;

        let result = client(&server)
            .generate(&[ChatMessage::user("What is X?")], 0.7)
            .await
            .unwrap();

        assert_eq!(result.text, "X is Y.");
        assert_eq!(result.model_id, OpenAiClient::GPT_3_5_TURBO);
        assert_eq!(result.tokens_used, Some(42));
        mock.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn test_chat_sends_temperature_and_messages() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions").is_true(|req| {
                    let body: serde_json::Value =
                        serde_json::from_slice(req.body().as_ref()).unwrap_or_default();
                    body["temperature"] == json!(0.0)
                        && body["messages"][0]["role"] == "system"
                        && body["messages"][1]["content"] == "hello"
                        && body.get("max_tokens").is_none()
                });
                then.status(200).json_body(json!({
                    "choices": [ { "message": { "content": "ok" } } ]
                }));
            })
            .await;

        let messages = [ChatMessage::system("be brief"), ChatMessage::user("hello")];
        let result = client(&server).generate(&messages, 0.0).await.unwrap();

        assert_eq!(result.text, "ok");
        assert_eq!(result.tokens_used, None);
        mock.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn test_chat_error_status_is_reported() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(401).body("invalid api key");
            })
            .await;

        let err = client(&server)
            .generate(&[ChatMessage::user("hi")], 0.7)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::LLMProvider(_)));
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("invalid api key"));
    }

    #[tokio::test]
    async fn test_chat_without_content_is_an_error() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({ "choices": [] }));
            })
            .await;

        let err = client(&server)
            .generate(&[ChatMessage::user("hi")], 0.7)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Empty response from OpenAI"));
    }

    #[tokio::test]
    async fn test_embeddings_are_reordered_by_index() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).path("/embeddings");
                then.status(200).json_body(json!({
                    "data": [
                        { "index": 1, "embedding": [0.0, 1.0] },
                        { "index": 0, "embedding": [1.0, 0.0] }
                    ]
                }));
            })
            .await;

        let vectors = client(&server)
            .embed_documents(&["first".to_string(), "second".to_string()])
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_embeddings_count_mismatch_is_an_error() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).path("/embeddings");
                then.status(200).json_body(json!({
                    "data": [ { "index": 0, "embedding": [1.0] } ]
                }));
            })
            .await;

        let err = client(&server)
            .embed_documents(&["a".to_string(), "b".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Embedding(_)));
    }

    #[tokio::test]
    async fn test_embed_query_single_vector() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/embeddings").is_true(|req| {
                    let body: serde_json::Value =
                        serde_json::from_slice(req.body().as_ref()).unwrap_or_default();
                    body["model"] == "text-embedding-ada-002" && body["input"] == json!(["q"])
                });
                then.status(200).json_body(json!({
                    "data": [ { "index": 0, "embedding": [0.5, 0.5] } ]
                }));
            })
            .await;

        let vector = client(&server).embed_query("q").await.unwrap();
        assert_eq!(vector, vec![0.5, 0.5]);
        mock.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_request() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/embeddings");
                then.status(500);
            })
            .await;

        let vectors = client(&server).embed_documents(&[]).await.unwrap();
        assert!(vectors.is_empty());
        mock.assert_calls_async(0).await;
    }
}

#[cfg(test)]
mod config_tests {
    use crate::{DEFAULT_API_URL, Embedder, LLMProvider, OpenAiClient, OpenAiConfig};

    #[test]
    fn test_config_defaults() {
        let config = OpenAiConfig::new("sk-test");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.chat_model, "gpt-3.5-turbo");
        assert_eq!(config.embedding_model, "text-embedding-ada-002");
    }

    #[test]
    fn test_api_url_trailing_slash_is_trimmed() {
        let config = OpenAiConfig::new("k").with_api_url("http://localhost:8080/v1/");
        assert_eq!(config.api_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_with_model_overrides_chat_model() {
        let client = OpenAiClient::new(OpenAiConfig::new("k")).unwrap().with_model("gpt-4o-mini");
        assert_eq!(client.model_id(), "gpt-4o-mini");
        assert_eq!(client.dimension(), 1536);
    }
}
