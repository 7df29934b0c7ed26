pub mod aggregate;
pub mod extract;
pub mod fetcher;
pub mod forum;
pub mod interest;
pub mod pipeline;
pub mod ranker;
pub mod tokenizer;

pub use aggregate::{aggregate_titles, CandidatePool};
pub use fetcher::{FetchError, FetchedBody, SourceFetcher};
pub use forum::{ForumSource, TitleSource};
pub use interest::{
    enrich_candidates, heat_from_buckets, EnrichedTerm, GoogleTrendsClient, InterestSource,
    ENRICH_BATCH_SIZE, ENRICH_POOL_SIZE,
};
pub use pipeline::{TrendPipeline, TrendService, RELATED_SEED_TERMS};
pub use ranker::{rank, FusionWeights, DEFAULT_FUSION_WEIGHTS, UPTREND_RANKS};
pub use tokenizer::{is_admissible, normalize_key, tokenize, KEY_MAX_CHARS};
