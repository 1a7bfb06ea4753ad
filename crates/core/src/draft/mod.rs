//! Post drafts and their structural validation.

mod types;
mod validator;

pub use types::{DraftMode, PostDraft};
pub use validator::{
    normalized_length, DraftError, DraftValidator, MAX_POST_LENGTH, THREAD_LENGTH, URL_WEIGHT,
};
