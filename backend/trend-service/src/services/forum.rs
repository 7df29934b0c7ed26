/// Forum title source
///
/// Walks the most recent listing pages of the cookie-gated PTT Stock board.
/// Pages are fetched sequentially; each page's outcome is reported
/// separately so the pipeline can skip failures without aborting the walk.
use async_trait::async_trait;
use tracing::warn;

use super::extract::{discover_latest_index, extract_titles};
use super::fetcher::{FetchError, SourceFetcher};

/// The board's age-gate cookie; without it the upstream serves a consent
/// page with no titles.
const FORUM_COOKIE: (&str, &str) = ("cookie", "over18=1");

/// Seam over the scraped source for pipeline tests.
#[async_trait]
pub trait TitleSource: Send + Sync {
    /// Title batches for the most recent `pages` pages, one outcome per page.
    async fn fetch_recent(&self, pages: usize) -> Vec<Result<Vec<String>, FetchError>>;
}

pub struct ForumSource {
    fetcher: SourceFetcher,
    base_url: String,
}

impl ForumSource {
    pub fn new(fetcher: SourceFetcher, base_url: String) -> Self {
        Self { fetcher, base_url }
    }

    fn landing_url(&self) -> String {
        format!("{}/index.html", self.base_url)
    }

    fn page_url(&self, index: u32) -> String {
        format!("{}/index{}.html", self.base_url, index)
    }

    fn headers() -> Vec<(String, String)> {
        vec![(FORUM_COOKIE.0.to_string(), FORUM_COOKIE.1.to_string())]
    }

    async fn fetch_page(&self, url: &str) -> Result<Vec<String>, FetchError> {
        let body = self.fetcher.fetch_with_retry(url, &Self::headers()).await?;
        Ok(body.as_text().map(extract_titles).unwrap_or_default())
    }

    /// Highest pagination index linked from the landing page. `None` keeps
    /// the walk on the landing page alone.
    async fn latest_index(&self) -> Option<u32> {
        match self.fetch_landing_markup().await {
            Ok(html) => discover_latest_index(&html),
            Err(e) => {
                warn!("Forum index discovery failed: {}", e);
                None
            }
        }
    }

    async fn fetch_landing_markup(&self) -> Result<String, FetchError> {
        let body = self
            .fetcher
            .fetch_with_retry(&self.landing_url(), &Self::headers())
            .await?;
        Ok(body.as_text().unwrap_or_default().to_string())
    }
}

#[async_trait]
impl TitleSource for ForumSource {
    async fn fetch_recent(&self, pages: usize) -> Vec<Result<Vec<String>, FetchError>> {
        let latest = self.latest_index().await;

        let mut outcomes = Vec::with_capacity(pages);
        for back in 0..pages {
            let url = latest
                .and_then(|l| l.checked_sub(back as u32))
                .map(|idx| self.page_url(idx))
                .unwrap_or_else(|| self.landing_url());

            outcomes.push(self.fetch_page(&url).await);
        }
        outcomes
    }
}
