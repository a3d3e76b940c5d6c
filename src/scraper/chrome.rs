use std::path::Path;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    Cookie, CookieParam, CookieSameSite, TimeSinceEpoch,
};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::app::{Result, ScrivenerError};
use crate::scraper::config::ScraperConfig;
use crate::scraper::{BrowserPage, StoredCookie};

/// The single Chrome instance a run drives
pub struct ChromeBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromeBrowser {
    /// Launch Chrome, optionally on a persistent profile directory
    pub async fn launch(config: &ScraperConfig, profile_dir: Option<&Path>) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .window_size(config.viewport_width, config.viewport_height)
            .viewport(Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                ..Default::default()
            })
            .request_timeout(config.navigation_timeout());

        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(dir) = profile_dir {
            std::fs::create_dir_all(dir)?;
            builder = builder.user_data_dir(dir);
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScrivenerError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            ScrivenerError::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        // Spawn the browser handler
        let handler = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {
                // Handle browser events
            }
        });

        Ok(Self { browser, handler })
    }

    /// Open the page the whole run is processed on
    pub async fn new_page(&self, config: &ScraperConfig) -> Result<ChromePage> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrivenerError::Browser(format!("Failed to create page: {}", e)))?;

        if let Some(ref ua) = config.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(|e| ScrivenerError::Browser(format!("Failed to set user agent: {}", e)))?;
        }

        Ok(ChromePage { page })
    }

    pub async fn close(mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(|e| ScrivenerError::Browser(format!("Failed to close browser: {}", e)))?;
        if let Err(e) = self.browser.wait().await {
            warn!("Browser process did not exit cleanly: {}", e);
        }
        self.handler.abort();
        Ok(())
    }
}

#[derive(Deserialize)]
struct QueryResult {
    found: bool,
    text: String,
}

pub struct ChromePage {
    page: Page,
}

impl ChromePage {
    async fn evaluate<T: DeserializeOwned>(&self, script: String) -> Result<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| ScrivenerError::Browser(format!("Script execution failed: {}", e)))?
            .into_value()
            .map_err(|e| ScrivenerError::Browser(format!("Failed to parse result: {:?}", e)))
    }
}

#[async_trait]
impl BrowserPage for ChromePage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ScrivenerError::Browser(format!("Navigation failed: {}", e)))?;
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        let title = self
            .page
            .get_title()
            .await
            .map_err(|e| ScrivenerError::Browser(format!("Failed to read title: {}", e)))?;
        Ok(title.unwrap_or_default())
    }

    async fn body_text(&self) -> Result<String> {
        self.evaluate("document.body ? document.body.innerText : ''".to_string())
            .await
    }

    async fn query_text(&self, selector: &str) -> Result<Option<String>> {
        let selector = serde_json::to_string(selector)?;
        let found: QueryResult = self
            .evaluate(format!(
                r#"
                (() => {{
                    const el = document.querySelector({selector});
                    if (!el) return {{ found: false, text: '' }};
                    return {{ found: true, text: el.innerText || el.textContent || '' }};
                }})()
                "#
            ))
            .await?;
        Ok(found.found.then_some(found.text))
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        let selector = serde_json::to_string(selector)?;
        self.evaluate(format!("document.querySelector({selector}) !== null"))
            .await
    }

    async fn scroll_by(&self, dy: u32) -> Result<()> {
        self.page
            .evaluate(format!("window.scrollBy(0, {dy})"))
            .await
            .map_err(|e| ScrivenerError::Browser(format!("Scroll failed: {}", e)))?;
        Ok(())
    }

    async fn scroll_height(&self) -> Result<u64> {
        let height: f64 = self
            .evaluate("document.body ? document.body.scrollHeight : 0".to_string())
            .await?;
        Ok(height.max(0.0) as u64)
    }

    async fn cookies(&self) -> Result<Vec<StoredCookie>> {
        let cookies = self
            .page
            .get_cookies()
            .await
            .map_err(|e| ScrivenerError::Browser(format!("Failed to read cookies: {}", e)))?;
        Ok(cookies.iter().map(stored_cookie).collect())
    }

    async fn set_cookies(&self, cookies: &[StoredCookie]) -> Result<()> {
        let params: Vec<CookieParam> = cookies
            .iter()
            .filter_map(|c| match cookie_param(c) {
                Ok(param) => Some(param),
                Err(e) => {
                    warn!("Skipping saved cookie {}: {}", c.name, e);
                    None
                }
            })
            .collect();

        if params.is_empty() {
            return Ok(());
        }

        self.page
            .set_cookies(params)
            .await
            .map_err(|e| ScrivenerError::Browser(format!("Failed to set cookies: {}", e)))?;
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.page
            .save_screenshot(ScreenshotParams::builder().full_page(true).build(), path)
            .await
            .map_err(|e| ScrivenerError::Browser(format!("Screenshot failed: {}", e)))?;
        Ok(())
    }
}

fn stored_cookie(cookie: &Cookie) -> StoredCookie {
    StoredCookie {
        name: cookie.name.clone(),
        value: cookie.value.clone(),
        domain: cookie.domain.clone(),
        path: cookie.path.clone(),
        expires: (!cookie.session).then_some(cookie.expires),
        http_only: cookie.http_only,
        secure: cookie.secure,
        same_site: cookie.same_site.as_ref().map(|s| {
            match s {
                CookieSameSite::Strict => "Strict",
                CookieSameSite::Lax => "Lax",
                CookieSameSite::None => "None",
            }
            .to_string()
        }),
    }
}

fn cookie_param(cookie: &StoredCookie) -> std::result::Result<CookieParam, String> {
    let mut builder = CookieParam::builder()
        .name(cookie.name.clone())
        .value(cookie.value.clone())
        .domain(cookie.domain.clone())
        .path(cookie.path.clone())
        .http_only(cookie.http_only)
        .secure(cookie.secure);

    if let Some(expires) = cookie.expires.filter(|e| *e > 0.0) {
        builder = builder.expires(TimeSinceEpoch::new(expires));
    }

    let same_site = match cookie.same_site.as_deref() {
        Some("Strict") => Some(CookieSameSite::Strict),
        Some("Lax") => Some(CookieSameSite::Lax),
        Some("None") => Some(CookieSameSite::None),
        _ => None,
    };
    if let Some(same_site) = same_site {
        builder = builder.same_site(same_site);
    }

    builder.build()
}
