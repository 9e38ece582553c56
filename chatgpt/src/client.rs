use async_trait::async_trait;
use chatbox_common::Config;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Single-turn payload: the model identifier plus one user message.
    pub fn single_turn(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(text)],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

impl ChatResponse {
    /// Content of the first choice; anything else in the list is ignored.
    pub fn first_content(self) -> Result<String, ClientError> {
        self.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ClientError::MalformedResponse("no choices in response".to_string()))
    }
}

#[async_trait]
pub trait CompletionClient {
    async fn complete(&self, text: String) -> Result<String, ClientError>;
}

/// A very small stub client for testing the flow.
pub struct StubClient;

#[async_trait]
impl CompletionClient for StubClient {
    async fn complete(&self, text: String) -> Result<String, ClientError> {
        Ok(format!("echo: {text}"))
    }
}

/// Chat Completions client: one POST per turn, no streaming, first choice only.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    pub model: String,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, text: String) -> Result<String, ClientError> {
        let body = ChatRequest::single_turn(&self.model, text);
        tracing::debug!(model = %self.model, endpoint = %self.endpoint, "sending completion request");

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%status, "completion request rejected");
            return Err(ClientError::Status { status, body });
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;
        parsed.first_content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_single_turn_request() {
        let req = ChatRequest::single_turn("gpt-3.5-turbo", "Hello");
        let serialized = serde_json::to_string(&req).unwrap();
        assert_eq!(
            serialized,
            r#"{"model":"gpt-3.5-turbo","messages":[{"role":"user","content":"Hello"}]}"#
        );
    }

    #[test]
    fn first_choice_content_is_read() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"Hi"}}]}"#).unwrap();
        assert_eq!(parsed.first_content().unwrap(), "Hi");
    }

    #[test]
    fn only_the_first_choice_is_read() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"first"}},{"message":{"role":"assistant","content":"second"}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.first_content().unwrap(), "first");
    }

    #[test]
    fn empty_choices_is_malformed() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            parsed.first_content(),
            Err(ClientError::MalformedResponse(_))
        ));
    }

    #[test]
    fn missing_choices_is_malformed() {
        let parsed: ChatResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(matches!(
            parsed.first_content(),
            Err(ClientError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn stub_client_echoes() {
        let out = StubClient.complete("ping".to_string()).await.unwrap();
        assert_eq!(out, "echo: ping");
    }
}
