//! Post and thread generation on top of an `LlmClient`.

use std::sync::Arc;

use tracing::{debug, warn};

use super::llm::{CompletionRequest, LlmClient, LlmError};
use super::prompts::{single_post_prompt, thread_prompt, THREAD_PREFIX};
use crate::draft::{DraftError, DraftMode, DraftValidator, PostDraft, THREAD_LENGTH};
use crate::metrics::GENERATIONS_TOTAL;

/// Errors from a generation attempt.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Source text is empty")]
    EmptySource,

    #[error("Completion failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Completion returned no content")]
    Empty,

    #[error("Expected {expected} thread posts, got {actual}")]
    InvalidThreadCount { expected: usize, actual: usize },

    #[error("Generated content is invalid: {0}")]
    Validation(#[from] DraftError),
}

impl GenerationError {
    /// Whether re-invoking with the same input may succeed.
    ///
    /// Structurally invalid completions are retryable; transport and
    /// provider failures are surfaced as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::Empty
                | GenerationError::InvalidThreadCount { .. }
                | GenerationError::Validation(_)
        )
    }
}

/// Turns source text into validated drafts. One completion per call, no
/// internal retries.
pub struct ContentGenerator {
    llm: Arc<dyn LlmClient>,
    max_tokens: u32,
    temperature: f32,
}

impl ContentGenerator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            max_tokens: 1024,
            temperature: 0.7,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn llm(&self) -> &dyn LlmClient {
        self.llm.as_ref()
    }

    /// Generate one standalone post.
    pub async fn generate_single(&self, source: &str) -> Result<PostDraft, GenerationError> {
        let outcome = self.single(source).await;
        record_outcome(DraftMode::Single, &outcome);
        outcome
    }

    /// Generate a thread of exactly `THREAD_LENGTH` posts.
    pub async fn generate_thread(&self, source: &str) -> Result<Vec<PostDraft>, GenerationError> {
        let outcome = self.thread(source).await;
        record_outcome(DraftMode::Thread, &outcome);
        outcome
    }

    /// Generate drafts for either mode. Single mode yields one draft.
    pub async fn generate(
        &self,
        source: &str,
        mode: DraftMode,
    ) -> Result<Vec<PostDraft>, GenerationError> {
        match mode {
            DraftMode::Single => Ok(vec![self.generate_single(source).await?]),
            DraftMode::Thread => self.generate_thread(source).await,
        }
    }

    async fn single(&self, source: &str) -> Result<PostDraft, GenerationError> {
        let source = non_empty(source)?;
        let text = self.complete(single_post_prompt(source)).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::Empty);
        }
        DraftValidator::validate_post(text)?;
        Ok(PostDraft::new(text))
    }

    async fn thread(&self, source: &str) -> Result<Vec<PostDraft>, GenerationError> {
        let source = non_empty(source)?;
        let text = self.complete(thread_prompt(source)).await?;
        if text.trim().is_empty() {
            return Err(GenerationError::Empty);
        }

        let posts = parse_thread(&text);
        if posts.len() != THREAD_LENGTH {
            return Err(GenerationError::InvalidThreadCount {
                expected: THREAD_LENGTH,
                actual: posts.len(),
            });
        }
        DraftValidator::validate_thread(&posts)?;
        Ok(posts.into_iter().map(PostDraft::new).collect())
    }

    async fn complete(&self, prompt: String) -> Result<String, GenerationError> {
        let request = CompletionRequest::new(prompt)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        let response = self.llm.complete(request).await?;
        debug!(
            provider = self.llm.provider(),
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Completion received"
        );
        Ok(response.text)
    }
}

/// Extract thread entries: lines starting with the thread prefix, prefix
/// stripped and trimmed. Other lines are ignored.
pub fn parse_thread(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| line.trim().strip_prefix(THREAD_PREFIX))
        .map(|rest| rest.trim().to_string())
        .collect()
}

fn non_empty(source: &str) -> Result<&str, GenerationError> {
    let source = source.trim();
    if source.is_empty() {
        Err(GenerationError::EmptySource)
    } else {
        Ok(source)
    }
}

fn record_outcome<T>(mode: DraftMode, outcome: &Result<T, GenerationError>) {
    let result = match outcome {
        Ok(_) => "success",
        Err(e) => {
            warn!(mode = mode.as_str(), error = %e, "Generation failed");
            if e.is_retryable() {
                "invalid"
            } else {
                "failed"
            }
        }
    };
    GENERATIONS_TOTAL
        .with_label_values(&[mode.as_str(), result])
        .inc();
}
