/// External Score Enricher
///
/// Queries a search-interest signal (Google Trends widget API) for a bounded
/// subset of top candidates. Enrichment never fails a term upward: any fetch
/// or format error logs and yields heat 0, and batches are sized to respect
/// upstream rate limits.
use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::fetcher::{parse_prefixed_json, FetchError, FetchedBody, SourceFetcher};

/// Terms enriched concurrently per batch; batches run sequentially.
pub const ENRICH_BATCH_SIZE: usize = 5;

/// Only this many top candidates (by local score) get an external lookup.
pub const ENRICH_POOL_SIZE: usize = 40;

/// Trailing interest window requested from the trends API.
const TRENDS_TIME_RANGE: &str = "now 7-d";

/// Number of trailing time buckets averaged into the heat value.
const HEAT_BUCKET_COUNT: usize = 24;

const TRENDS_LOCALE: &str = "zh-TW";
const TRENDS_TZ: &str = "-480";

/// A candidate term carrying both score signals, ready for fusion.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedTerm {
    pub term: String,
    pub local_score: f64,
    /// 0..=100; 0 when enrichment failed or returned no buckets
    pub heat: f64,
    pub discovery_index: usize,
}

/// Seam over the interest upstream, so the pipeline is testable without a
/// network.
#[async_trait]
pub trait InterestSource: Send + Sync {
    /// Interest-over-time buckets for one term. May fail; callers must
    /// degrade to heat 0.
    async fn interest_over_time(&self, term: &str) -> Result<Vec<f64>, FetchError>;

    /// Related-term discovery: `(query, relevance weight)` pairs surfaced
    /// for a seed term.
    async fn related_queries(&self, seed: &str) -> Result<Vec<(String, f64)>, FetchError>;
}

/// Rounded mean of the last `HEAT_BUCKET_COUNT` buckets, clamped to 0..=100.
pub fn heat_from_buckets(buckets: &[f64]) -> f64 {
    if buckets.is_empty() {
        return 0.0;
    }
    let tail = &buckets[buckets.len().saturating_sub(HEAT_BUCKET_COUNT)..];
    let avg = tail.iter().sum::<f64>() / tail.len() as f64;
    avg.round().clamp(0.0, 100.0)
}

/// Enrich the candidate list in bounded batches. Per-term failure is
/// isolated: the term keeps its local score and gets heat 0.
pub async fn enrich_candidates<S>(
    source: &S,
    candidates: Vec<(String, f64, usize)>,
) -> Vec<EnrichedTerm>
where
    S: InterestSource + ?Sized,
{
    let mut enriched = Vec::with_capacity(candidates.len());

    for batch in candidates.chunks(ENRICH_BATCH_SIZE) {
        let lookups = batch.iter().map(|(term, _, _)| async move {
            match source.interest_over_time(term).await {
                Ok(buckets) => heat_from_buckets(&buckets),
                Err(e) => {
                    warn!("Interest lookup failed for '{}': {}", term, e);
                    0.0
                }
            }
        });

        let heats = join_all(lookups).await;

        for ((term, local_score, discovery_index), heat) in
            batch.iter().cloned().zip(heats.into_iter())
        {
            enriched.push(EnrichedTerm {
                term,
                local_score,
                heat,
                discovery_index,
            });
        }
    }

    enriched
}

/// Client for the trends widget API: an explore call hands out per-widget
/// tokens, then widgetdata endpoints serve the actual series.
#[derive(Clone)]
pub struct GoogleTrendsClient {
    fetcher: SourceFetcher,
    base_url: String,
    geo: String,
}

impl GoogleTrendsClient {
    pub fn new(fetcher: SourceFetcher, base_url: String, geo: String) -> Self {
        Self {
            fetcher,
            base_url,
            geo,
        }
    }

    async fn explore(&self, keyword: &str) -> Result<Value, FetchError> {
        let req = json!({
            "comparisonItem": [{
                "keyword": keyword,
                "geo": self.geo,
                "time": TRENDS_TIME_RANGE,
            }],
            "category": 0,
            "property": "",
        });
        let url = format!(
            "{}/trends/api/explore?hl={}&tz={}&req={}",
            self.base_url,
            TRENDS_LOCALE,
            TRENDS_TZ,
            urlencoding::encode(&req.to_string())
        );

        let body = self.fetcher.fetch_with_retry(&url, &[]).await?;
        into_prefixed_json(body)
    }

    async fn widget_data(&self, endpoint: &str, widget: &Value) -> Result<Value, FetchError> {
        let token = widget
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| FetchError::BadUpstreamFormat("widget without token".to_string()))?;
        let request = widget
            .get("request")
            .ok_or_else(|| FetchError::BadUpstreamFormat("widget without request".to_string()))?;

        let url = format!(
            "{}/trends/api/widgetdata/{}?hl={}&tz={}&req={}&token={}",
            self.base_url,
            endpoint,
            TRENDS_LOCALE,
            TRENDS_TZ,
            urlencoding::encode(&request.to_string()),
            token
        );

        let body = self.fetcher.fetch_with_retry(&url, &[]).await?;
        into_prefixed_json(body)
    }

    async fn find_widget(&self, keyword: &str, id: &str) -> Result<Value, FetchError> {
        let explore = self.explore(keyword).await?;
        explore
            .get("widgets")
            .and_then(Value::as_array)
            .and_then(|widgets| {
                widgets
                    .iter()
                    .find(|w| w.get("id").and_then(Value::as_str) == Some(id))
            })
            .cloned()
            .ok_or_else(|| {
                FetchError::BadUpstreamFormat(format!("explore response missing {} widget", id))
            })
    }
}

#[async_trait]
impl InterestSource for GoogleTrendsClient {
    async fn interest_over_time(&self, term: &str) -> Result<Vec<f64>, FetchError> {
        let widget = self.find_widget(term, "TIMESERIES").await?;
        let data = self.widget_data("multiline", &widget).await?;

        let buckets = parse_timeline_buckets(&data);
        debug!("Interest series for '{}': {} buckets", term, buckets.len());
        Ok(buckets)
    }

    async fn related_queries(&self, seed: &str) -> Result<Vec<(String, f64)>, FetchError> {
        let widget = self.find_widget(seed, "RELATED_QUERIES").await?;
        let data = self.widget_data("relatedsearches", &widget).await?;
        Ok(parse_related_queries(&data))
    }
}

fn into_prefixed_json(body: FetchedBody) -> Result<Value, FetchError> {
    match body {
        // the XSSI prefix normally defeats the fetcher's own JSON sniffing,
        // so the interesting path is Text
        FetchedBody::Json(value) => Ok(value),
        FetchedBody::Text(text) => parse_prefixed_json(&text),
    }
}

/// `default.timelineData[].value[0]` as a flat series.
pub fn parse_timeline_buckets(data: &Value) -> Vec<f64> {
    data.pointer("/default/timelineData")
        .and_then(Value::as_array)
        .map(|points| {
            points
                .iter()
                .filter_map(|p| p.pointer("/value/0").and_then(Value::as_f64))
                .collect()
        })
        .unwrap_or_default()
}

/// `default.rankedList[].rankedKeyword[]` flattened to `(query, value)`.
pub fn parse_related_queries(data: &Value) -> Vec<(String, f64)> {
    data.pointer("/default/rankedList")
        .and_then(Value::as_array)
        .map(|lists| {
            lists
                .iter()
                .filter_map(|l| l.get("rankedKeyword").and_then(Value::as_array))
                .flatten()
                .filter_map(|kw| {
                    let query = kw.get("query").and_then(Value::as_str)?;
                    let value = kw.get("value").and_then(Value::as_f64)?;
                    Some((query.to_string(), value))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[test]
    fn test_heat_is_mean_of_last_24_buckets() {
        // 30 buckets: 6 high ones that must fall outside the window
        let mut buckets = vec![100.0; 6];
        buckets.extend(vec![50.0; 24]);
        assert_eq!(heat_from_buckets(&buckets), 50.0);
    }

    #[test]
    fn test_heat_short_series_uses_all_buckets() {
        assert_eq!(heat_from_buckets(&[10.0, 20.0, 30.0]), 20.0);
    }

    #[test]
    fn test_heat_empty_is_zero() {
        assert_eq!(heat_from_buckets(&[]), 0.0);
    }

    #[test]
    fn test_heat_rounded_and_clamped() {
        assert_eq!(heat_from_buckets(&[10.0, 11.0]), 11.0); // 10.5 rounds up
        assert_eq!(heat_from_buckets(&[250.0]), 100.0);
    }

    #[test]
    fn test_parse_timeline_buckets() {
        let data = serde_json::json!({
            "default": {
                "timelineData": [
                    {"time": "1", "value": [42]},
                    {"time": "2", "value": [58]},
                    {"time": "3", "formattedValue": ["-"]}
                ]
            }
        });
        assert_eq!(parse_timeline_buckets(&data), vec![42.0, 58.0]);
    }

    #[test]
    fn test_parse_related_queries() {
        let data = serde_json::json!({
            "default": {
                "rankedList": [
                    {"rankedKeyword": [
                        {"query": "台積電 股價", "value": 100},
                        {"query": "台積電 法說", "value": 55}
                    ]},
                    {"rankedKeyword": [
                        {"query": "0050", "value": 30}
                    ]}
                ]
            }
        });
        assert_eq!(
            parse_related_queries(&data),
            vec![
                ("台積電 股價".to_string(), 100.0),
                ("台積電 法說".to_string(), 55.0),
                ("0050".to_string(), 30.0),
            ]
        );
    }

    struct ScriptedInterest {
        heats: HashMap<String, Vec<f64>>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl InterestSource for ScriptedInterest {
        async fn interest_over_time(&self, term: &str) -> Result<Vec<f64>, FetchError> {
            self.calls.lock().unwrap().push(term.to_string());
            self.heats
                .get(term)
                .cloned()
                .ok_or_else(|| FetchError::Transport("scripted failure".to_string()))
        }

        async fn related_queries(&self, _seed: &str) -> Result<Vec<(String, f64)>, FetchError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_enrich_isolates_per_term_failure() {
        let source = ScriptedInterest {
            heats: HashMap::from([("台積電".to_string(), vec![80.0; 24])]),
            calls: Mutex::new(vec![]),
        };
        let candidates = vec![
            ("台積電".to_string(), 12.0, 0),
            ("聯發科".to_string(), 9.0, 1),
        ];

        let enriched = enrich_candidates(&source, candidates).await;
        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].heat, 80.0);
        assert_eq!(enriched[1].heat, 0.0);
        assert_eq!(enriched[1].local_score, 9.0);
    }

    #[tokio::test]
    async fn test_enrich_whole_batch_failing_yields_zero_heat_for_all() {
        let source = ScriptedInterest {
            heats: HashMap::new(),
            calls: Mutex::new(vec![]),
        };
        let candidates: Vec<_> = (0..7)
            .map(|i| (format!("term{}", i), 1.0, i))
            .collect();

        let enriched = enrich_candidates(&source, candidates).await;
        assert_eq!(enriched.len(), 7);
        assert!(enriched.iter().all(|t| t.heat == 0.0));
        // every term was still attempted, across two batches of 5 and 2
        assert_eq!(source.calls.lock().unwrap().len(), 7);
    }
}
