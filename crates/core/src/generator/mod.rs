//! Draft generation from source text via a completion provider.
//!
//! `ContentGenerator` wraps an `LlmClient`, builds the instruction prompt for
//! the requested `DraftMode` and validates what comes back. A thread
//! completion that does not parse to exactly seven posts is rejected whole.

mod config;
mod content;
mod llm;
mod prompts;

pub use config::{LlmConfig, LlmProvider};
pub use content::{parse_thread, ContentGenerator, GenerationError};
pub use llm::{
    create_llm_client, AnthropicClient, CompletionRequest, CompletionResponse, LlmClient,
    LlmError, LlmUsage, OllamaClient, OpenAiClient,
};
pub use prompts::{single_post_prompt, thread_prompt, THREAD_PREFIX};
