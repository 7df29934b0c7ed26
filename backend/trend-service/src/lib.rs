pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};

// Re-export pipeline components
pub use services::{
    CandidatePool, EnrichedTerm, GoogleTrendsClient, InterestSource, SourceFetcher, TitleSource,
    TrendPipeline, TrendService,
};
