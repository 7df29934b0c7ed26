/// Trending keywords API handler
///
/// The boundary contract is "always parseable JSON, never a 5xx for a
/// recoverable upstream failure": the service absorbs pipeline errors and
/// this handler only shapes its payload.
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::services::TrendService;

/// Query parameters for GET /api/v1/trends
#[derive(Debug, Deserialize)]
pub struct TrendsQuery {
    /// Truthy value bypasses the cache fresh-check
    pub nocache: Option<String>,
}

fn is_truthy(value: &Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::to_ascii_lowercase).as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

/// GET /api/v1/trends
#[get("/api/v1/trends")]
pub async fn get_trends(
    query: web::Query<TrendsQuery>,
    service: web::Data<Arc<TrendService>>,
) -> HttpResponse {
    let bypass = is_truthy(&query.nocache);
    debug!("Trends request (nocache={})", bypass);

    let payload = service.get_trends(bypass).await;
    let max_age_secs = service.cache_ttl_ms() / 1000;

    HttpResponse::Ok()
        .insert_header(("cache-control", format!("public, max-age={}", max_age_secs)))
        .json(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy(&Some("1".to_string())));
        assert!(is_truthy(&Some("true".to_string())));
        assert!(is_truthy(&Some("TRUE".to_string())));
        assert!(!is_truthy(&Some("0".to_string())));
        assert!(!is_truthy(&Some("".to_string())));
        assert!(!is_truthy(&None));
    }
}
