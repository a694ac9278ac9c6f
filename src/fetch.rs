use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::csv;
use crate::info::info_data;
use crate::menu::normalize::menu_data;
use crate::site::{non_blank, SourceUrls};
use crate::state::{Tab, TabData};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("{tab} data unavailable: remote {remote}; fallback {path}: {fallback}")]
    Unavailable {
        tab: Tab,
        remote: String,
        path: PathBuf,
        #[source]
        fallback: std::io::Error,
    },
}

/// Loads one tab's CSV: the published sheet URL first, then a single
/// fallback hop to `<data_dir>/<tab>.csv`.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    data_dir: PathBuf,
    urls: Arc<SourceUrls>,
}

impl Fetcher {
    pub fn new(urls: SourceUrls, data_dir: impl Into<PathBuf>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Fetcher {
            client,
            data_dir: data_dir.into(),
            urls: Arc::new(urls),
        })
    }

    fn url(&self, tab: Tab) -> Option<&str> {
        let url = match tab {
            Tab::Cuisine => &self.urls.cuisine,
            Tab::Bar => &self.urls.bar,
            Tab::Info => &self.urls.info,
        };
        non_blank(url)
    }

    pub fn fallback_path(&self, tab: Tab) -> PathBuf {
        self.data_dir.join(format!("{}.csv", tab.key()))
    }

    pub async fn fetch_text(&self, tab: Tab) -> Result<String, FetchError> {
        let remote = match self.url(tab).filter(|url| !needs_fallback(url)) {
            Some(url) => match self.get(url).await {
                Ok(text) => {
                    info!(tab = %tab, bytes = text.len(), "fetched sheet");
                    return Ok(text);
                }
                Err(e) => {
                    warn!(tab = %tab, error = %e, "sheet fetch failed, using local copy");
                    e.to_string()
                }
            },
            None => {
                debug!(tab = %tab, "no sheet URL configured, using local copy");
                "not configured".to_string()
            }
        };

        let path = self.fallback_path(tab);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|fallback| FetchError::Unavailable {
                tab,
                remote,
                path,
                fallback,
            })
    }

    async fn get(&self, url: &str) -> reqwest::Result<String> {
        self.client
            .get(with_cache_buster(url, now_millis()))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }

    /// Fetch, parse and normalize one tab.
    pub async fn fetch(&self, tab: Tab) -> Result<TabData, FetchError> {
        let text = self.fetch_text(tab).await?;
        let rows = csv::parse(&text);
        debug!(tab = %tab, rows = rows.len(), "parsed sheet");
        Ok(match tab {
            Tab::Info => TabData::Info(Arc::new(info_data(&rows))),
            Tab::Cuisine | Tab::Bar => TabData::Menu(Arc::new(menu_data(&rows))),
        })
    }
}

/// Placeholder URLs left over from the sheet template are never requested.
fn needs_fallback(url: &str) -> bool {
    url.contains("PASTE_")
}

fn with_cache_buster(url: &str, millis: u128) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}t={millis}")
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(cuisine: &str) -> SourceUrls {
        SourceUrls {
            cuisine: Some(cuisine.to_string()),
            bar: None,
            info: Some("https://docs.example/PASTE_INFO_URL".to_string()),
        }
    }

    #[test]
    fn cache_buster_separator() {
        assert_eq!(
            with_cache_buster("https://docs.example/pub?output=csv", 42),
            "https://docs.example/pub?output=csv&t=42"
        );
        assert_eq!(with_cache_buster("https://docs.example/pub", 7), "https://docs.example/pub?t=7");
    }

    #[test]
    fn placeholder_urls_skip_the_network() {
        assert!(needs_fallback("PASTE_CUISINE_CSV_URL_HERE"));
        assert!(!needs_fallback("https://docs.example/pub?output=csv"));
    }

    #[tokio::test]
    async fn unconfigured_tab_reads_local_copy() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::copy("tests/fixtures/cuisine.csv", dir.path().join("cuisine.csv")).unwrap();
        let fetcher = Fetcher::new(urls(""), dir.path()).unwrap();

        let TabData::Menu(menu) = fetcher.fetch(Tab::Cuisine).await.unwrap() else {
            panic!("expected menu data");
        };
        assert_eq!(menu.categories.len(), 3);
    }

    #[tokio::test]
    async fn placeholder_info_url_reads_local_copy() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::copy("tests/fixtures/info.csv", dir.path().join("info.csv")).unwrap();
        let fetcher = Fetcher::new(urls(""), dir.path()).unwrap();

        let data = fetcher.fetch(Tab::Info).await.unwrap();
        assert!(matches!(data, TabData::Info(info) if !info.hours_location.is_empty()));
    }

    #[tokio::test]
    async fn unreachable_remote_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cuisine.csv"), "nome_it,attivo\nPane,x\n").unwrap();
        let fetcher = Fetcher::new(urls("http://127.0.0.1:9/sheet.csv"), dir.path()).unwrap();

        let text = fetcher.fetch_text(Tab::Cuisine).await.unwrap();
        assert!(text.contains("Pane"));
    }

    #[tokio::test]
    async fn missing_fallback_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(urls(""), dir.path()).unwrap();

        let err = fetcher.fetch(Tab::Bar).await.unwrap_err();
        assert!(matches!(err, FetchError::Unavailable { tab: Tab::Bar, .. }));
    }
}
