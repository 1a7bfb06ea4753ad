//! Image candidates for composed drafts.
//!
//! Each draft position owns a list of candidate URLs and a refresh counter.
//! Default refreshes are rate-limited per position; supplying a custom query
//! always succeeds and restores the quota.

mod config;
mod pool;

pub use config::ImagePoolConfig;
pub use pool::{ImageCandidatePool, ImagePoolError, ImageSource, PositionImages};
