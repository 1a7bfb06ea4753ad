//! Publishing drafts to the social platform.
//!
//! A `Publisher` creates posts and uploads media; a `MediaFetcher` turns
//! image URLs into bytes. `PublishPipeline` drives both, strictly one entry
//! at a time, so each post can reply to the one before it.

mod media;
mod oauth;
mod pipeline;
mod types;
mod x_client;

pub use media::{decode_data_uri, to_data_uri, HttpMediaFetcher};
pub use oauth::{authorization_header, OAuthCredentials};
pub use pipeline::{PublishError, PublishPipeline, DEFAULT_MEDIA_TYPE};
pub use types::*;
pub use x_client::XClient;
