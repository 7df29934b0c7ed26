use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub scrape: ScrapeConfig,
    pub trends: TrendsConfig,
    pub cache: CacheConfig,
    pub ranking: RankingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Board listing base URL, e.g. https://www.ptt.cc/bbs/Stock
    pub forum_base_url: String,
    /// How many most-recent listing pages to walk
    pub pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendsConfig {
    pub base_url: String,
    /// Geographic scope for interest queries
    pub geo: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub path: String,
    pub ttl_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    pub max_terms: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            app: AppConfig {
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                port: std::env::var("APP_PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .context("APP_PORT must be a valid port number")?,
                log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            scrape: ScrapeConfig {
                forum_base_url: std::env::var("FORUM_BASE_URL")
                    .unwrap_or_else(|_| default_forum_base_url()),
                pages: std::env::var("SCRAPE_PAGES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(default_scrape_pages),
            },
            trends: TrendsConfig {
                base_url: std::env::var("TRENDS_BASE_URL")
                    .unwrap_or_else(|_| default_trends_base_url()),
                geo: std::env::var("TRENDS_GEO").unwrap_or_else(|_| "TW".to_string()),
            },
            cache: CacheConfig {
                path: std::env::var("CACHE_PATH").unwrap_or_else(|_| default_cache_path()),
                ttl_ms: std::env::var("CACHE_TTL_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(default_cache_ttl_ms),
            },
            ranking: RankingConfig {
                max_terms: std::env::var("MAX_TERMS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(default_max_terms),
            },
        })
    }
}

fn default_forum_base_url() -> String {
    "https://www.ptt.cc/bbs/Stock".to_string()
}

fn default_scrape_pages() -> usize {
    6
}

fn default_trends_base_url() -> String {
    "https://trends.google.com".to_string()
}

fn default_cache_path() -> String {
    "/tmp/stock_trends_tw_cache.json".to_string()
}

fn default_cache_ttl_ms() -> i64 {
    60 * 60 * 1000 // 1 hour
}

fn default_max_terms() -> usize {
    20
}
