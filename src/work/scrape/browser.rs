use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as Chromium, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use log::{debug, warn};
use tokio::task::JoinHandle;

use crate::error::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// The handful of browser operations the scraper needs.
///
/// `close` takes the browser by value, so a browser can be released at most
/// once; `scrape::run` makes sure it is released at least once.
#[async_trait]
pub trait Browser: Send {
    async fn goto(&mut self, url: &str) -> Result<(), Error>;

    /// Resolves once an element matching `selector` exists. Never times out on
    /// its own.
    async fn wait_for_selector(&mut self, selector: &str) -> Result<(), Error>;

    /// The current DOM serialized as HTML.
    async fn content(&mut self) -> Result<String, Error>;

    async fn close(self) -> Result<(), Error>;
}

pub struct ChromiumBrowser {
    browser: Chromium,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromiumBrowser {
    pub async fn launch() -> Result<Self, Error> {
        let config = BrowserConfig::builder()
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .build()
            .map_err(|err| Error::Browser(format!("failed to build browser config: {}", err)))?;

        let (mut browser, mut handler) = Chromium::launch(config)
            .await
            .map_err(|err| Error::Browser(format!("failed to launch Chromium: {}", err)))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!("Browser handler error: {}", err);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(err) => {
                if let Err(close_err) = shut_down(&mut browser).await {
                    warn!("Failed to close browser after page error: {}", close_err);
                }
                handler.abort();
                return Err(Error::Browser(format!("failed to open page: {}", err)));
            }
        };

        Ok(ChromiumBrowser {
            browser,
            page,
            handler,
        })
    }
}

/// Asks Chromium to close and waits for it. If the request fails the process
/// is killed instead, so this never waits on a browser that is still running.
async fn shut_down(browser: &mut Chromium) -> Result<(), Error> {
    match browser.close().await {
        Ok(_) => {
            browser.wait().await?;
            Ok(())
        }
        Err(err) => {
            warn!("Chromium did not close, killing it: {}", err);
            match browser.kill().await {
                Some(Ok(())) => debug!("Chromium killed"),
                Some(Err(kill_err)) => warn!("Failed to kill Chromium: {}", kill_err),
                None => debug!("No Chromium child process to kill"),
            }
            Err(Error::Browser(format!("failed to close Chromium: {}", err)))
        }
    }
}

#[async_trait]
impl Browser for ChromiumBrowser {
    async fn goto(&mut self, url: &str) -> Result<(), Error> {
        self.page
            .goto(url)
            .await
            .map_err(|err| Error::Navigation {
                url: url.to_string(),
                reason: err.to_string(),
            })?;
        Ok(())
    }

    async fn wait_for_selector(&mut self, selector: &str) -> Result<(), Error> {
        loop {
            match self.page.find_element(selector).await {
                Ok(_) => return Ok(()),
                Err(err) => {
                    debug!("{} not there yet: {}", selector, err);
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            }
        }
    }

    async fn content(&mut self) -> Result<String, Error> {
        self.page
            .content()
            .await
            .map_err(|err| Error::Browser(format!("failed to read page content: {}", err)))
    }

    async fn close(mut self) -> Result<(), Error> {
        let closed = shut_down(&mut self.browser).await;

        if closed.is_err() {
            self.handler.abort();
        }
        if let Err(err) = self.handler.await {
            debug!("Browser handler task ended: {}", err);
        }

        debug!("Browser closed");
        closed
    }
}
