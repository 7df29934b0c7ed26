use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Constituent scores behind a ranked keyword, retained for debuggability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Occurrence count (scrape path) or summed related-query weight
    pub local_score: f64,
    /// External search-interest heat, 0..=100 (0 when enrichment failed)
    pub heat: f64,
    pub fused_score: f64,
}

/// Final output record. Immutable once produced; `rank` is 1-indexed and
/// rank 1 carries the highest fused score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedKeyword {
    pub id: u32,
    pub keyword: String,
    pub rank: u32,
    /// String rendering of the dominant volume signal, floored at 1
    pub display_volume: String,
    /// Presentational label only ("up" for the top ranks, "→" otherwise)
    pub trend: String,
    pub last_update: DateTime<Utc>,
    pub provenance: Provenance,
}

/// Response body for GET /api/v1/trends. Always parseable JSON; on a
/// degraded run `note` carries the diagnostic and `keywords` may be empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendsPayload {
    pub keywords: Vec<RankedKeyword>,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
