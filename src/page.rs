use std::time::Duration;

use chromiumoxide::page::Page as CrPage;
use url::Url;

use crate::error::{Error, Result};

/// A live browser tab, wrapped with the few operations the crawl needs.
pub struct LivePage {
    inner: CrPage,
    ready_selector: String,
    render_timeout: Duration,
}

impl LivePage {
    pub(crate) fn new(inner: CrPage, ready_selector: String, render_timeout: Duration) -> Self {
        Self {
            inner,
            ready_selector,
            render_timeout,
        }
    }

    /// Navigate to the given URL.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.inner.goto(url).await.map_err(|e| Error::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    /// The URL the page actually landed on (after redirects).
    pub async fn current_url(&self) -> Result<Url> {
        let raw = self
            .inner
            .url()
            .await?
            .ok_or_else(|| Error::Fetch {
                url: String::new(),
                reason: "page has no URL".into(),
            })?;
        Ok(Url::parse(&raw)?)
    }

    /// Wait for the configured ready selector to appear in the DOM.
    /// Polls every 100ms up to the render timeout.
    pub async fn wait_until_rendered(&self, url: &str) -> Result<()> {
        let interval = Duration::from_millis(100);
        let start = std::time::Instant::now();

        loop {
            match self.inner.find_element(self.ready_selector.as_str()).await {
                Ok(_) => return Ok(()),
                Err(_) if start.elapsed() < self.render_timeout => {
                    tokio::time::sleep(interval).await;
                }
                Err(_) => {
                    return Err(Error::FetchTimeout {
                        url: url.to_string(),
                    });
                }
            }
        }
    }

    /// Get the full rendered HTML content of the page.
    pub async fn html(&self) -> Result<String> {
        self.inner.content().await.map_err(Error::Cdp)
    }
}
