//! Editing state for a draft set before it is published.

mod thread;

pub use thread::{ComposeError, ThreadComposer, ThreadSnapshot};
