use actix_web::{web, App, HttpServer};
use resilience::RetryConfig;
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trend_service::cache::{CacheManager, FileCacheStore, SystemClock};
use trend_service::config::Config;
use trend_service::handlers::{get_trends, health};
use trend_service::services::{
    ForumSource, GoogleTrendsClient, SourceFetcher, TrendPipeline, TrendService,
};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Structured logging with JSON format
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_line_number(true)
                .with_file(true)
                .with_target(true),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting trend-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let fetcher = SourceFetcher::new(reqwest::Client::new(), RetryConfig::default());

    let forum = Arc::new(ForumSource::new(
        fetcher.clone(),
        config.scrape.forum_base_url.clone(),
    ));
    let trends_client = Arc::new(GoogleTrendsClient::new(
        fetcher,
        config.trends.base_url.clone(),
        config.trends.geo.clone(),
    ));

    let pipeline = TrendPipeline::new(
        forum,
        trends_client,
        config.scrape.pages,
        config.ranking.max_terms,
    );
    let cache = CacheManager::new(
        Arc::new(FileCacheStore::new(&config.cache.path)),
        Arc::new(SystemClock),
        config.cache.ttl_ms,
    );
    let service = Arc::new(TrendService::new(pipeline, cache));

    let port = config.app.port;
    tracing::info!("HTTP server listening on 0.0.0.0:{}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(service.clone()))
            .service(get_trends)
            .service(health)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
