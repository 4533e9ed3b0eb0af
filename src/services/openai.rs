//! OpenAI-compatible client for chat completions and audio transcription.
//!
//! The API key is read from the configured environment variable on every
//! call, so a missing key only matters once a stage actually needs it.

use crate::config::OpenAiConfig;
use crate::error::{DecoError, Result};
use crate::services::chat::{ChatService, Completion};
use crate::services::ingest::{AudioInput, IngestService};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

const SERVICE: &str = "OpenAI";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the OpenAI REST API (or any server speaking its dialect).
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key_env: String,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key_env: config.api_key_env.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| DecoError::MissingCredentials {
                service: SERVICE.to_string(),
                message: format!("set {} to your API key", self.api_key_env),
            })
    }

    /// Send a prepared request and return the body of a successful reply.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<String> {
        let response = request
            .send()
            .await
            .map_err(|e| DecoError::http(SERVICE, e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DecoError::http(SERVICE, format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(DecoError::provider(
                SERVICE,
                status.as_u16(),
                error_message(&text),
            ));
        }
        Ok(text)
    }
}

/// Request body for a single-turn chat completion at temperature 0.
fn chat_request_body(system_prompt: &str, user_text: &str, model: &str) -> serde_json::Value {
    json!({
        "model": model,
        "temperature": 0.0,
        "stream": false,
        "messages": [
            { "role": "system", "content": system_prompt },
            { "role": "user", "content": user_text },
        ],
    })
}

fn parse_chat_response(body: &str) -> Result<Completion> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| DecoError::http(SERVICE, format!("Failed to parse chat response: {e}")))?;

    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| DecoError::http(SERVICE, "chat response has no content"))?;

    Ok(Completion {
        text,
        prompt_tokens: response.usage.map(|u| u.prompt_tokens).unwrap_or(0),
    })
}

fn parse_transcription_response(body: &str) -> Result<String> {
    let response: TranscriptionResponse = serde_json::from_str(body).map_err(|e| {
        DecoError::http(SERVICE, format!("Failed to parse transcription response: {e}"))
    })?;
    Ok(response.text)
}

/// Pull `error.message` out of an error reply, or fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[async_trait]
impl ChatService for OpenAiClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_text: &str,
        model: &str,
    ) -> Result<Completion> {
        let api_key = self.api_key()?;
        let body = chat_request_body(system_prompt, user_text, model);
        let payload = serde_json::to_vec(&body)
            .map_err(|e| DecoError::Other(format!("Failed to encode chat request: {e}")))?;

        let request = self
            .http
            .post(self.endpoint("chat/completions"))
            .bearer_auth(api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload);

        let text = self.execute(request).await?;
        parse_chat_response(&text)
    }

    fn name(&self) -> &str {
        SERVICE
    }
}

#[async_trait]
impl IngestService for OpenAiClient {
    async fn transcribe(&self, audio: &AudioInput, model: &str) -> Result<String> {
        let api_key = self.api_key()?;

        let part = reqwest::multipart::Part::bytes(audio.data.clone())
            .file_name(audio.file_name())
            .mime_str(audio.format.mime_type())
            .map_err(|e| DecoError::http(SERVICE, e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("model", model.to_string())
            .part("file", part);

        let request = self
            .http
            .post(self.endpoint("audio/transcriptions"))
            .bearer_auth(api_key)
            .multipart(form);

        let text = self.execute(request).await?;
        parse_transcription_response(&text)
    }

    fn name(&self) -> &str {
        SERVICE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_body_has_system_then_user() {
        let body = chat_request_body("be terse", "hello", "gpt-4o-mini");
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be terse");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "hello");
    }

    #[test]
    fn parses_content_and_prompt_tokens() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Clean text."}}],
            "usage": {"prompt_tokens": 42, "completion_tokens": 3, "total_tokens": 45}
        }"#;
        let completion = parse_chat_response(body).unwrap();
        assert_eq!(completion.text, "Clean text.");
        assert_eq!(completion.prompt_tokens, 42);
    }

    #[test]
    fn missing_usage_counts_zero_tokens() {
        let body = r#"{"choices": [{"message": {"content": "x"}}]}"#;
        assert_eq!(parse_chat_response(body).unwrap().prompt_tokens, 0);
    }

    #[test]
    fn empty_choices_is_error() {
        let body = r#"{"choices": []}"#;
        assert!(matches!(
            parse_chat_response(body),
            Err(DecoError::Http { .. })
        ));
    }

    #[test]
    fn parses_transcription_text() {
        assert_eq!(
            parse_transcription_response(r#"{"text": "hello world"}"#).unwrap(),
            "hello world"
        );
    }

    #[test]
    fn error_message_prefers_api_error_field() {
        let body = r#"{"error": {"message": "Invalid API key", "type": "auth"}}"#;
        assert_eq!(error_message(body), "Invalid API key");
        assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let client = OpenAiClient::new(&OpenAiConfig {
            base_url: "http://localhost:9000/v1/".to_string(),
            ..OpenAiConfig::default()
        });
        assert_eq!(
            client.endpoint("chat/completions"),
            "http://localhost:9000/v1/chat/completions"
        );
    }

    #[test]
    fn missing_key_is_credentials_error() {
        let client = OpenAiClient::new(&OpenAiConfig {
            api_key_env: "DECO_TEST_UNSET_OPENAI_KEY".to_string(),
            ..OpenAiConfig::default()
        });
        assert!(matches!(
            client.api_key(),
            Err(DecoError::MissingCredentials { .. })
        ));
    }
}
