use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::browser::Browser;
use crate::error::Result;
use crate::page::LivePage;

/// Fully client-side-rendered markup of a fetched page, plus the URL the
/// browser actually landed on.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub url: Url,
    pub html: String,
}

/// The traverser's only view of the network: give it a URL, get back a
/// rendered page. Implemented by [`BrowserFetcher`] in production and by
/// in-memory fakes in tests.
#[async_trait]
pub trait PageSource {
    async fn fetch(&mut self, url: &Url) -> Result<RenderedPage>;
}

/// Fetches pages through a single reused browser tab. Navigating the same
/// tab instead of opening one per event keeps Chrome's footprint flat over
/// long chains.
pub struct BrowserFetcher {
    browser: Browser,
    tab: LivePage,
}

impl BrowserFetcher {
    /// Open the shared tab. The browser stays blank until the first fetch.
    pub async fn start(browser: Browser) -> Result<Self> {
        let tab = browser.new_page("about:blank").await?;
        Ok(Self { browser, tab })
    }

    /// Release the tab and shut Chrome down.
    pub async fn close(self) -> Result<()> {
        self.browser.close().await
    }
}

#[async_trait]
impl PageSource for BrowserFetcher {
    async fn fetch(&mut self, url: &Url) -> Result<RenderedPage> {
        debug!(%url, "fetching page");

        self.tab.goto(url.as_str()).await?;
        self.tab.wait_until_rendered(url.as_str()).await?;

        let html = self.tab.html().await?;
        // Redirects are common on Indico (e.g. trailing-slash canonicalization);
        // record the URL the page settled on, falling back to the requested one.
        let final_url = self.tab.current_url().await.unwrap_or_else(|_| url.clone());

        Ok(RenderedPage {
            url: final_url,
            html,
        })
    }
}
