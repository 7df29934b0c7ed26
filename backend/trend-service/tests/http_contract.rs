//! HTTP boundary contract: the trends endpoint always answers 200 with
//! parseable JSON and advertises a public max-age matching the cache TTL,
//! on healthy and degraded runs alike.

use actix_web::{test, web, App};
use async_trait::async_trait;
use std::sync::Arc;

use trend_service::cache::{CacheManager, MemoryCacheStore, SystemClock};
use trend_service::handlers::get_trends;
use trend_service::services::fetcher::FetchError;
use trend_service::services::{InterestSource, TitleSource, TrendPipeline, TrendService};

struct FixedBoard {
    titles: Vec<String>,
}

#[async_trait]
impl TitleSource for FixedBoard {
    async fn fetch_recent(&self, pages: usize) -> Vec<Result<Vec<String>, FetchError>> {
        (0..pages).map(|_| Ok(self.titles.clone())).collect()
    }
}

struct DownBoard;

#[async_trait]
impl TitleSource for DownBoard {
    async fn fetch_recent(&self, pages: usize) -> Vec<Result<Vec<String>, FetchError>> {
        (0..pages)
            .map(|_| Err(FetchError::Transport("upstream down".to_string())))
            .collect()
    }
}

struct DownInterest;

#[async_trait]
impl InterestSource for DownInterest {
    async fn interest_over_time(&self, _term: &str) -> Result<Vec<f64>, FetchError> {
        Err(FetchError::Transport("upstream down".to_string()))
    }

    async fn related_queries(&self, _seed: &str) -> Result<Vec<(String, f64)>, FetchError> {
        Err(FetchError::Transport("upstream down".to_string()))
    }
}

fn service_with(board: Arc<dyn TitleSource>) -> web::Data<Arc<TrendService>> {
    let pipeline = TrendPipeline::new(board, Arc::new(DownInterest), 2, 20);
    let cache = CacheManager::new(
        Arc::new(MemoryCacheStore::new()),
        Arc::new(SystemClock),
        3_600_000,
    );
    web::Data::new(Arc::new(TrendService::new(pipeline, cache)))
}

#[actix_web::test]
async fn test_success_response_carries_public_max_age() {
    let data = service_with(Arc::new(FixedBoard {
        titles: vec!["[情報] 台積電法說會重點整理".to_string()],
    }));
    let app = test::init_service(App::new().app_data(data).service(get_trends)).await;

    let req = test::TestRequest::get().uri("/api/v1/trends").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    let cache_control = resp
        .headers()
        .get("cache-control")
        .expect("cache-control header required")
        .to_str()
        .unwrap();
    assert_eq!(cache_control, "public, max-age=3600");

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(!body["keywords"].as_array().unwrap().is_empty());
    assert!(body.get("note").is_none());
}

#[actix_web::test]
async fn test_degraded_response_is_still_200_json_with_header() {
    let data = service_with(Arc::new(DownBoard));
    let app = test::init_service(App::new().app_data(data).service(get_trends)).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/trends?nocache=1")
        .to_request();
    let resp = test::call_service(&app, req).await;

    // recoverable upstream failure never becomes a 5xx
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()
            .get("cache-control")
            .unwrap()
            .to_str()
            .unwrap(),
        "public, max-age=3600"
    );

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["keywords"].as_array().unwrap().is_empty());
    assert!(!body["note"].as_str().unwrap().is_empty());
}
