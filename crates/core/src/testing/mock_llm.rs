//! Mock LLM client for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::generator::{CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage};

/// Mock implementation of the LlmClient trait.
///
/// Scripted completions are consumed in order; once the script is exhausted
/// the default response is returned. Every prompt is recorded.
pub struct MockLlmClient {
    script: Arc<RwLock<VecDeque<Result<String, LlmError>>>>,
    default_response: Arc<RwLock<String>>,
    prompts: Arc<RwLock<Vec<String>>>,
}

impl std::fmt::Debug for MockLlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLlmClient")
            .field("script", &"<script>")
            .finish()
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            script: Arc::new(RwLock::new(VecDeque::new())),
            default_response: Arc::new(RwLock::new(String::new())),
            prompts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Queue a completion text.
    pub async fn push_response(&self, text: impl Into<String>) {
        self.script.write().await.push_back(Ok(text.into()));
    }

    /// Queue a failure.
    pub async fn push_error(&self, error: LlmError) {
        self.script.write().await.push_back(Err(error));
    }

    /// Response used once the script is empty.
    pub async fn set_default_response(&self, text: impl Into<String>) {
        *self.default_response.write().await = text.into();
    }

    pub async fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.read().await.clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.prompts.write().await.push(request.prompt);

        let next = self.script.write().await.pop_front();
        let text = match next {
            Some(result) => result?,
            None => self.default_response.read().await.clone(),
        };

        Ok(CompletionResponse {
            usage: LlmUsage {
                input_tokens: 0,
                output_tokens: text.split_whitespace().count() as u32,
            },
            text,
            model: "mock-model".to_string(),
        })
    }
}
