//! Chat provider integrations
//!
//! The provider is the one place this service talks to the outside world.
//! Each submission makes exactly one call; nothing is retried, cached, or
//! streamed.

mod cohere;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;

use crate::conversation::Message;

pub use cohere::CohereProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Authentication rejected: {0}")]
    Auth(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// One chat request as the external API sees it
#[derive(Debug, Clone, Copy)]
pub struct ChatCall<'a> {
    pub model: &'a str,
    /// The latest user message
    pub message: &'a str,
    pub temperature: f32,
    /// The full conversation log, system prompt first
    pub history: &'a [Message],
}

/// Common interface for chat backends
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send one request and return the reply text
    async fn chat(&self, call: ChatCall<'_>) -> Result<String, ProviderError>;

    /// Short provider name for logs
    fn name(&self) -> &str;
}

/// Logging wrapper for chat providers
pub struct LoggingProvider {
    inner: Arc<dyn ChatProvider>,
}

impl LoggingProvider {
    pub fn new(inner: Arc<dyn ChatProvider>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ChatProvider for LoggingProvider {
    async fn chat(&self, call: ChatCall<'_>) -> Result<String, ProviderError> {
        let start = Instant::now();
        let result = self.inner.chat(call).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    provider = %self.inner.name(),
                    model = %call.model,
                    history_len = call.history.len(),
                    duration_ms = %duration.as_millis(),
                    reply_chars = reply.chars().count(),
                    "Chat request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    provider = %self.inner.name(),
                    model = %call.model,
                    duration_ms = %duration.as_millis(),
                    error = %e,
                    "Chat request failed"
                );
            }
        }

        result
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedProvider;
    use super::*;
    use crate::conversation::Role;

    #[tokio::test]
    async fn test_logging_provider_passes_through() {
        let inner = Arc::new(ScriptedProvider::with_replies(&["Namaste!"]));
        let provider = LoggingProvider::new(inner.clone());
        let history = [Message {
            role: Role::System,
            content: "guide".into(),
        }];
        let call = ChatCall {
            model: "command-nightly",
            message: "Hello",
            temperature: 0.7,
            history: &history,
        };

        assert_eq!(provider.chat(call).await.unwrap(), "Namaste!");
        assert!(provider.chat(call).await.is_err());
        assert_eq!(provider.name(), "scripted");
        assert_eq!(inner.calls().len(), 2);
    }
}
