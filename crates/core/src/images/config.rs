use serde::{Deserialize, Serialize};

/// Image candidate pool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePoolConfig {
    /// Free refreshes per position before a custom query is required.
    #[serde(default = "default_refresh_limit")]
    pub refresh_limit: u32,
    /// Upper bound of the random 1-based result offset used by refreshes.
    #[serde(default = "default_max_random_offset")]
    pub max_random_offset: u32,
}

fn default_refresh_limit() -> u32 {
    3
}

fn default_max_random_offset() -> u32 {
    50
}

impl Default for ImagePoolConfig {
    fn default() -> Self {
        Self {
            refresh_limit: default_refresh_limit(),
            max_random_offset: default_max_random_offset(),
        }
    }
}
