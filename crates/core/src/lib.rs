pub mod composer;
pub mod config;
pub mod draft;
pub mod generator;
pub mod images;
pub mod metrics;
pub mod publisher;
pub mod searcher;
pub mod testing;

pub use composer::{ComposeError, ThreadComposer, ThreadSnapshot};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config, ConfigError,
    SanitizedConfig,
};
pub use draft::{DraftError, DraftMode, DraftValidator, PostDraft};
pub use generator::{create_llm_client, ContentGenerator, GenerationError, LlmClient};
pub use images::{ImageCandidatePool, ImagePoolConfig, ImagePoolError, ImageSource};
pub use publisher::{
    HttpMediaFetcher, MediaFetcher, PublishError, PublishPipeline, PublishRecord, Publisher,
    PublisherError, XClient,
};
pub use searcher::{
    CombinedSearchResult, GoogleSearchClient, RankedResultSet, ResultItem, SearchAggregator,
    SearchError, SearchProvider, SimpleSearchResult,
};
