// src/core/completion_client.rs
//! Chat completion client for the external language model

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

const CHAT_COMPLETIONS_ENDPOINT: &str = "/chat/completions";

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("completion returned no content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

pub struct CompletionClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl CompletionClient {
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        timeout_seconds: u64,
    ) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// Send one user prompt and return the first choice's text. Not retried.
    pub async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let url = format!("{}{}", self.base_url, CHAT_COMPLETIONS_ENDPOINT);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        info!("Calling completion service: {} (model {})", url, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            error!("Completion service error {}: {}", status, message);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_responses;

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Tailored text"}}]}"#;
        let (base_url, requests) = serve_responses(vec![(200, body.to_string())]).await;

        let client = CompletionClient::new("sk-test", &base_url, "gpt-3.5-turbo", 5).unwrap();
        let text = client.complete("Tailor this").await.unwrap();

        assert_eq!(text, "Tailored text");
        let seen = requests.lock().await;
        assert_eq!(seen.len(), 1);
        assert!(seen[0].starts_with("POST /chat/completions"));
        assert!(seen[0].to_lowercase().contains("authorization: bearer sk-test"));
        assert!(seen[0].contains("\"model\":\"gpt-3.5-turbo\""));
    }

    #[tokio::test]
    async fn test_api_error_is_not_retried() {
        let body = r#"{"error":{"message":"Incorrect API key provided"}}"#;
        let (base_url, requests) = serve_responses(vec![
            (401, body.to_string()),
            (200, "{}".to_string()),
        ])
        .await;

        let client = CompletionClient::new("bad", &base_url, "gpt-3.5-turbo", 5).unwrap();
        let err = client.complete("prompt").await.unwrap_err();

        match err {
            CompletionError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(requests.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let (base_url, _) = serve_responses(vec![(200, r#"{"choices":[]}"#.to_string())]).await;

        let client = CompletionClient::new("sk-test", &base_url, "gpt-3.5-turbo", 5).unwrap();
        assert!(matches!(
            client.complete("prompt").await,
            Err(CompletionError::EmptyContent)
        ));
    }
}
