//! Cohere chat provider
//!
//! Talks to the v1 `/chat` endpoint: the latest message goes in `message`
//! and the whole log goes in `chat_history`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::conversation::{Message, Role};

use super::{ChatCall, ChatProvider, ProviderError};

pub struct CohereProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct CohereRequest<'a> {
    model: &'a str,
    message: &'a str,
    temperature: f32,
    chat_history: Vec<CohereMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct CohereMessage<'a> {
    role: &'static str,
    message: &'a str,
}

impl<'a> From<&'a Message> for CohereMessage<'a> {
    fn from(msg: &'a Message) -> Self {
        Self {
            role: match msg.role {
                Role::System => "SYSTEM",
                Role::User => "USER",
                Role::Assistant => "CHATBOT",
            },
            message: &msg.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CohereResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct CohereErrorBody {
    message: String,
}

impl CohereProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ChatProvider for CohereProvider {
    async fn chat(&self, call: ChatCall<'_>) -> Result<String, ProviderError> {
        let request = CohereRequest {
            model: call.model,
            message: call.message,
            temperature: call.temperature,
            chat_history: call.history.iter().map(CohereMessage::from).collect(),
        };

        let response = self
            .client
            .post(format!("{}/chat", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(error_for_status(status, &body));
        }

        let reply: CohereResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse response: {} - Body: {}", e, body))
        })?;

        Ok(reply.text)
    }

    fn name(&self) -> &str {
        "cohere"
    }
}

fn error_for_status(status: StatusCode, body: &str) -> ProviderError {
    let message = serde_json::from_str::<CohereErrorBody>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(message),
        _ => ProviderError::Api {
            status: status.as_u16(),
            message,
        },
    }
}
