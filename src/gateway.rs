//! Gemini gateway: the one component that talks to the AI endpoint.
//!
//! One outbound call per user action, fire-once. No retry, no timeout, no
//! caching. Request failures never reach the UI as errors; `send` logs them
//! and hands back [`FALLBACK_REPLY`] instead.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ApiCredential;

/// Public Generative Language endpoint.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Shown in place of a reply whenever a request fails.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I encountered an error processing your request. Please try again later.";

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

// The same {parts: [{text}]} shape appears on both sides of the API.
#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Gemini API error {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("Gemini returned no reply text")]
    EmptyReply,
}

#[derive(Debug, Clone)]
pub struct AiGateway {
    client: Client,
    credential: ApiCredential,
    model: String,
    base_url: String,
}

impl AiGateway {
    pub fn new(credential: ApiCredential, model: &str) -> Self {
        Self::with_base_url(credential, model, GEMINI_API_BASE)
    }

    /// Point the gateway at a different host. Tests use this to aim at a
    /// local mock server.
    pub fn with_base_url(credential: ApiCredential, model: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            credential,
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send one prompt and return the reply text.
    ///
    /// Infallible by contract: on any failure the error is logged for
    /// diagnostics and the fixed fallback message is returned, so callers
    /// always have an assistant-facing string to show.
    pub async fn send(&self, prompt: &str) -> String {
        match self.generate(prompt).await {
            Ok(text) => text,
            Err(error) => {
                tracing::error!(model = %self.model, %error, "assistant request failed");
                FALLBACK_REPLY.to_string()
            }
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            self.credential.as_str()
        );

        let request = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: prompt.to_string() }] }],
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api { status, message: extract_error_message(&body) });
        }

        let reply: GenerateResponse = response.json().await?;
        reply
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.clone())
            .ok_or(GatewayError::EmptyReply)
    }
}

/// Pull the human-readable message out of a Google-style error body,
/// `{"error": {"message": "..."}}`, falling back to the raw body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|parsed| {
            parsed
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(|message| message.as_str())
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY_BODY: &str = r#"{
        "candidates": [
            {"content": {"parts": [{"text": "Stay hydrated and rest."}], "role": "model"}}
        ]
    }"#;

    fn test_gateway(base_url: &str) -> AiGateway {
        AiGateway::with_base_url(
            ApiCredential::for_tests("test-key"),
            "gemini-1.5-flash",
            base_url,
        )
    }

    #[tokio::test]
    async fn send_returns_model_text_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", mockito::Matcher::Regex(":generateContent".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(REPLY_BODY)
            .expect(1)
            .create_async()
            .await;

        let reply = test_gateway(&server.url()).send("What causes headaches?").await;
        assert_eq!(reply, "Stay hydrated and rest.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_is_normalized_to_the_fallback() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", mockito::Matcher::Regex(":generateContent".to_string()))
            .with_status(500)
            .with_body(r#"{"error": {"message": "internal error"}}"#)
            .expect(1)
            .create_async()
            .await;

        let reply = test_gateway(&server.url()).send("hello").await;
        assert_eq!(reply, FALLBACK_REPLY);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn undecodable_reply_is_normalized_to_the_fallback() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", mockito::Matcher::Regex(":generateContent".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json")
            .create_async()
            .await;

        let reply = test_gateway(&server.url()).send("hello").await;
        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn reply_without_candidates_is_normalized_to_the_fallback() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", mockito::Matcher::Regex(":generateContent".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let reply = test_gateway(&server.url()).send("hello").await;
        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn each_send_makes_exactly_one_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", mockito::Matcher::Regex(":generateContent".to_string()))
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        // A failure is not retried.
        let _ = test_gateway(&server.url()).send("hello").await;
        mock.assert_async().await;
    }

    #[test]
    fn google_error_bodies_are_unwrapped() {
        let body = r#"{"error": {"message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(extract_error_message(body), "API key not valid");
        assert_eq!(extract_error_message("plain text"), "plain text");
    }
}
