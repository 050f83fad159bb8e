//! Schedule formatting through an OpenAI-compatible chat-completions API (Groq).

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use studybuddy_core::constants::SCHEDULE_FORMAT_INSTRUCTION;

/// Sends syllabus text to a completion service and returns its raw output.
///
/// The output is expected, not guaranteed, to be a bare JSON schedule array.
#[async_trait]
pub trait ScheduleFormatter: Send + Sync {
    async fn format(&self, text: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Groq chat-completions client
#[derive(Clone)]
pub struct GroqScheduleFormatter {
    http_client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl GroqScheduleFormatter {
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for completion API")?;

        Ok(Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ScheduleFormatter for GroqScheduleFormatter {
    async fn format(&self, text: &str) -> Result<String> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SCHEDULE_FORMAT_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to completion API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "Completion API request failed: {} - {}",
                status,
                error_text
            ));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse completion API response")?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("Completion API response contained no message content")?;

        tracing::debug!(
            model = %self.model,
            input_chars = text.len(),
            output_chars = content.len(),
            "Schedule formatted"
        );

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn formatter(base: &str) -> GroqScheduleFormatter {
        GroqScheduleFormatter::new(base, "gsk_test", "llama3-70b-8192", Duration::from_secs(5))
            .unwrap()
    }

    #[tokio::test]
    async fn test_sends_instruction_and_returns_content() {
        let router = Router::new().route(
            "/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer gsk_test");
                assert_eq!(body["model"], "llama3-70b-8192");
                assert_eq!(body["messages"][0]["role"], "system");
                assert!(body["messages"][0]["content"]
                    .as_str()
                    .unwrap()
                    .contains("strict JSON formatter"));
                assert_eq!(body["messages"][1]["content"], "Week 1: Intro");
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": "[]"}}]
                }))
            }),
        );
        let base = spawn_upstream(router).await;

        let output = formatter(&base).format("Week 1: Intro").await.unwrap();
        assert_eq!(output, "[]");
    }

    #[tokio::test]
    async fn test_upstream_status_is_reported() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "rate limited") }),
        );
        let base = spawn_upstream(router).await;

        let err = formatter(&base).format("text").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("429"));
        assert!(message.contains("rate limited"));
    }

    #[tokio::test]
    async fn test_missing_content_is_an_error() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let base = spawn_upstream(router).await;

        assert!(formatter(&base).format("text").await.is_err());
    }
}
