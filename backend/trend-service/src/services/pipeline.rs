/// Pipeline orchestration and the cache-wrapped service
///
/// `TrendPipeline` runs one full scrape → filter → enrich → rank pass.
/// `TrendService` wraps it with the cache state machine: fresh entries are
/// served as-is, stale/missing/bypassed entries trigger recomputation, and
/// a failed pipeline degrades to the last persisted payload or an empty
/// payload with a diagnostic note. It never returns an error upward.
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::aggregate::aggregate_titles;
use super::forum::TitleSource;
use super::interest::{enrich_candidates, InterestSource, ENRICH_POOL_SIZE};
use super::ranker::{rank, FusionWeights, DEFAULT_FUSION_WEIGHTS};
use crate::cache::CacheManager;
use crate::error::{AppError, Result};
use crate::models::{RankedKeyword, TrendsPayload};

/// Whitelist seeds used for related-query discovery when the scrape admits
/// nothing.
pub const RELATED_SEED_TERMS: &[&str] = &["台積電", "0050", "聯發科", "降息", "財報"];

pub struct TrendPipeline {
    source: Arc<dyn TitleSource>,
    interest: Arc<dyn InterestSource>,
    pages: usize,
    max_terms: usize,
    weights: FusionWeights,
}

impl TrendPipeline {
    pub fn new(
        source: Arc<dyn TitleSource>,
        interest: Arc<dyn InterestSource>,
        pages: usize,
        max_terms: usize,
    ) -> Self {
        Self {
            source,
            interest,
            pages,
            max_terms,
            weights: DEFAULT_FUSION_WEIGHTS,
        }
    }

    pub async fn run(&self, now: DateTime<Utc>) -> Result<Vec<RankedKeyword>> {
        let outcomes = self.source.fetch_recent(self.pages).await;

        let mut titles: Vec<String> = Vec::new();
        for (page, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(batch) => titles.extend(batch),
                Err(e) => warn!("Skipping page {}: {}", page, e),
            }
        }
        debug!("Collected {} titles from {} pages", titles.len(), self.pages);

        let mut pool = aggregate_titles(&titles);

        if pool.is_empty() {
            debug!("Scrape admitted no terms, trying related-query discovery");
            for seed in RELATED_SEED_TERMS {
                match self.interest.related_queries(seed).await {
                    Ok(pairs) => {
                        for (query, weight) in pairs {
                            pool.merge_weighted(&query, weight);
                        }
                    }
                    Err(e) => warn!("Related-query discovery failed for '{}': {}", seed, e),
                }
            }
        }

        if pool.is_empty() {
            return Err(AppError::EmptyCandidatePool);
        }

        let top = pool.top_candidates(ENRICH_POOL_SIZE);
        let enriched = enrich_candidates(self.interest.as_ref(), top).await;

        Ok(rank(enriched, self.max_terms, &self.weights, now))
    }
}

pub struct TrendService {
    pipeline: TrendPipeline,
    cache: CacheManager,
}

impl TrendService {
    pub fn new(pipeline: TrendPipeline, cache: CacheManager) -> Self {
        Self { pipeline, cache }
    }

    pub fn cache_ttl_ms(&self) -> i64 {
        self.cache.ttl_ms()
    }

    /// The one entry point. `bypass_cache` skips the fresh-check (the
    /// `nocache` query parameter); the write-through and fallback paths run
    /// either way.
    pub async fn get_trends(&self, bypass_cache: bool) -> TrendsPayload {
        if !bypass_cache {
            if let Some(entry) = self.cache.read_fresh() {
                return TrendsPayload {
                    keywords: entry.payload,
                    timestamp: entry.written_at_ms,
                    note: None,
                };
            }
        }

        let now_ms = self.cache.now_millis();
        let now = DateTime::<Utc>::from_timestamp_millis(now_ms).unwrap_or_else(Utc::now);

        match self.pipeline.run(now).await {
            Ok(keywords) => match self.cache.write(keywords.clone()) {
                Ok(entry) => TrendsPayload {
                    keywords: entry.payload,
                    timestamp: entry.written_at_ms,
                    note: None,
                },
                Err(e) => {
                    // best-effort persistence; the fresh result still goes out
                    warn!("Cache write failed: {}", e);
                    TrendsPayload {
                        keywords,
                        timestamp: now_ms,
                        note: None,
                    }
                }
            },
            Err(e) => {
                error!("Pipeline failed: {}", e);
                match self.cache.read_any() {
                    Some(entry) => TrendsPayload {
                        keywords: entry.payload,
                        timestamp: entry.written_at_ms,
                        note: Some(format!("serving last cached result: {}", e)),
                    },
                    None => TrendsPayload {
                        keywords: Vec::new(),
                        timestamp: now_ms,
                        note: Some(e.to_string()),
                    },
                }
            }
        }
    }
}
