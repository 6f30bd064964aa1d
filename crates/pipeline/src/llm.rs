//! Provider-agnostic LLM call interface.

use std::fmt;

use async_trait::async_trait;

/// A caller-supplied provider key.
///
/// Never persisted and never printed: `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for placing in a request header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// One single-turn completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Role instructions for the agent.
    pub system: String,
    /// The task prompt, including any context from earlier tasks.
    pub prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Errors from an LLM provider.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("LLM request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("LLM provider error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The provider refused to answer (safety filters, recitation).
    #[error("LLM response blocked: {0}")]
    Blocked(String),

    /// The provider answered with no text.
    #[error("LLM returned an empty response")]
    Empty,
}

/// Something that can answer a [`CompletionRequest`].
///
/// The key is passed per call because it belongs to the requesting user,
/// not to the server.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short provider/model label for logs.
    fn name(&self) -> &str;

    /// Run one completion and return the generated text.
    async fn complete(
        &self,
        api_key: &ApiKey,
        request: &CompletionRequest,
    ) -> Result<String, LlmError>;
}
