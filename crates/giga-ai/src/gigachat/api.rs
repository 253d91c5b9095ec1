//! ChatEndpoint trait implementation for GigaChatClient.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tracing::debug;

use crate::streaming::sse_events;
use crate::{AiError, ChatEndpoint, ChatRequest, FragmentStream};

use super::client::{fragments, GigaChatClient};

#[async_trait]
impl ChatEndpoint for GigaChatClient {
    async fn open_stream(&self, request: &ChatRequest<'_>) -> Result<FragmentStream, AiError> {
        let body = self.build_request_body(request);

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            session = %self.config.session_id,
            "GigaChat streaming request"
        );

        let response = self
            .http
            .post(self.chat_url())
            .bearer_auth(&self.config.access_token)
            .header("X-Session-ID", self.config.session_id.to_string())
            .header(ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AiError::Auth("access token rejected (HTTP 401)".to_string()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AiError::Transport(format!("HTTP {status}: {text}")));
        }

        Ok(fragments(sse_events(response)))
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;
    use giga_common::{Model, SessionId};

    use super::*;
    use crate::gigachat::GigaChatConfig;
    use crate::test_support::{Reply, TestServer};
    use crate::tools::ToolDispatcher;
    use crate::{FinishReason, FunctionCallPolicy, Message, StreamFragment};

    fn client_for(server: &TestServer, session_id: SessionId) -> GigaChatClient {
        GigaChatClient::new(
            reqwest::Client::builder().no_proxy().build().unwrap(),
            GigaChatConfig::new("token-1")
                .with_base_url(format!("{}/api/v1", server.url))
                .with_session_id(session_id),
        )
    }

    async fn open(client: &GigaChatClient) -> Result<FragmentStream, AiError> {
        let tools = ToolDispatcher::builtin();
        let messages = vec![
            Message::system("Ты умеешь поддержать беседу и ответить на любой вопрос"),
            Message::user("Какая сейчас температура в Москве?"),
        ];
        let request = ChatRequest {
            model: Model::GigaChatMax,
            messages: &messages,
            functions: tools.declarations(),
            function_call: FunctionCallPolicy::Auto,
        };
        client.open_stream(&request).await
    }

    #[tokio::test]
    async fn streams_fragments_and_sends_session_headers() {
        let server = TestServer::start(Reply::sse(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Сейчас \",\"role\":\"assistant\"}}]}\n\n\
data: {\"choices\":[{\"delta\":{\"content\":\"узнаю\"},\"finish_reason\":\"stop\"}]}\n\n\
data: [DONE]\n\n",
        ))
        .await;
        let session_id = SessionId::new();
        let client = client_for(&server, session_id);

        let fragments: Vec<StreamFragment> = open(&client)
            .await
            .unwrap()
            .map(Result::unwrap)
            .collect()
            .await;
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].alternatives[0].content, "Сейчас ");
        assert_eq!(fragments[1].alternatives[0].finish_reason, FinishReason::Stop);

        let seen = server.request().await;
        assert!(
            seen.request_line.starts_with("POST /api/v1/chat/completions "),
            "{}",
            seen.request_line
        );
        assert_eq!(seen.header("authorization"), Some("Bearer token-1"));
        let sent_session = session_id.to_string();
        assert_eq!(seen.header("x-session-id"), Some(sent_session.as_str()));
        assert_eq!(seen.header("accept"), Some("text/event-stream"));
        assert_eq!(seen.header("content-type"), Some("application/json"));

        let body: serde_json::Value = serde_json::from_slice(&seen.body).unwrap();
        assert_eq!(body["model"], "GigaChat-Max");
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert_eq!(body["functions"][0]["name"], "get_current_temperature");
    }

    #[tokio::test]
    async fn rejected_token_is_an_auth_error() {
        let server = TestServer::start(Reply::json(401, r#"{"message":"Unauthorized"}"#)).await;
        let client = client_for(&server, SessionId::new());

        let err = open(&client).await.err().unwrap();
        assert!(matches!(err, AiError::Auth(_)), "{err}");
    }

    #[tokio::test]
    async fn server_error_is_a_transport_error() {
        let server = TestServer::start(Reply::json(500, r#"{"message":"internal"}"#)).await;
        let client = client_for(&server, SessionId::new());

        let err = open(&client).await.err().unwrap();
        match err {
            AiError::Transport(msg) => {
                assert!(msg.contains("500"), "{msg}");
                assert!(msg.contains("internal"), "{msg}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
