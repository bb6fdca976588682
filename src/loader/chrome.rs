//! Chrome/Chromium page session driven over CDP.

use super::PageSession;
use crate::config::BrowserConfig;
use crate::error::SessionError;
use async_trait::async_trait;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;

/// How often to look for the awaited element while a page renders.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Executable names tried on PATH when none is configured.
const EXECUTABLES: [&str; 4] = ["google-chrome", "chromium", "chromium-browser", "chrome"];

/// One browser with one page, reused for every load of a batch.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeSession {
    /// Launches the browser and opens a blank page.
    pub async fn launch(config: &BrowserConfig) -> Result<Self, SessionError> {
        let mut builder = chromiumoxide::BrowserConfig::builder();
        builder = if config.headless {
            builder.new_headless_mode()
        } else {
            builder.with_head()
        };
        if let Some(executable) = config.executable.clone().or_else(discover_executable) {
            builder = builder.chrome_executable(executable);
        }
        let browser_config = builder.build().map_err(SessionError::Browser)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| SessionError::Browser(format!("failed to launch browser: {e}")))?;

        // Process browser events in the background
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::Browser(format!("failed to create page: {e}")))?;

        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    /// Navigates and polls until `awaited` matches, then returns the source.
    ///
    /// A failed navigation (connection reset, DNS failure) is a
    /// [`SessionError::Network`]; other CDP failures are `Browser`.
    async fn render(&self, url: &str, awaited: &str) -> Result<String, SessionError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| SessionError::Network(e.to_string()))?;
        while self.page.find_element(awaited).await.is_err() {
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        self.page
            .content()
            .await
            .map_err(|e| SessionError::Browser(e.to_string()))
    }
}

/// Looks for a Chrome/Chromium binary on PATH.
fn discover_executable() -> Option<PathBuf> {
    EXECUTABLES.iter().find_map(|exe| which::which(exe).ok())
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn open(
        &mut self,
        url: &str,
        awaited: &str,
        timeout: Duration,
    ) -> Result<String, SessionError> {
        match tokio::time::timeout(timeout, self.render(url, awaited)).await {
            Ok(rendered) => rendered,
            Err(_) => Err(SessionError::Timeout),
        }
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        let closed = self
            .browser
            .close()
            .await
            .map_err(|e| SessionError::Browser(format!("failed to close browser: {e}")));
        let _ = self.browser.wait().await;
        self.handler.abort();
        closed.map(|_| ())
    }
}
