//! Browser-driven extraction pipeline.
//!
//! Each target flows strictly forward through the stages below, all sharing
//! one long-lived browser page:
//!
//! ```text
//! SessionManager (once) → Navigator → Settler → ContentExtractor → DocumentWriter
//! ```
//!
//! Stages only talk to the browser through [`BrowserPage`], so every stage can
//! be exercised against a scripted page instead of a live Chrome.
//!
//! # Usage
//!
//! ```rust,ignore
//! use scrivener::scraper::{ChromeBrowser, ScraperConfig};
//!
//! let config = ScraperConfig::default();
//! let browser = ChromeBrowser::launch(&config, None).await?;
//! let page = browser.new_page(&config).await?;
//! ```

mod chrome;
mod classify;
mod config;
mod extractor;
mod navigator;
mod session;
mod settle;
mod wait;

#[cfg(test)]
pub(crate) mod testing;

pub use chrome::{ChromeBrowser, ChromePage};
pub use classify::{ClassificationRule, RuleTable};
pub use config::{
    ClassifierConfig, InteractionConfig, ScraperConfig, SessionConfig, SessionStrategyKind,
    WaitKind,
};
pub use extractor::ContentExtractor;
pub use navigator::{NavigationPolicy, Navigator};
pub use session::{Credentials, Session, SessionManager, SessionSnapshot, SessionStrategy, StoredCookie};
pub use settle::{SettlePolicy, SettleReport, Settler};
pub use wait::{Confirmations, HumanLoop, InteractionMode, WaitOutcome, WaitStrategy};

use std::path::Path;

use async_trait::async_trait;

use crate::app::Result;

/// The page operations the pipeline needs from a browser
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Navigate and wait for the document to be parsed
    async fn goto(&self, url: &str) -> Result<()>;

    async fn title(&self) -> Result<String>;

    /// Rendered text of the whole body
    async fn body_text(&self) -> Result<String>;

    /// Rendered text of the first element matching `selector`, if any
    async fn query_text(&self, selector: &str) -> Result<Option<String>>;

    async fn exists(&self, selector: &str) -> Result<bool>;

    async fn scroll_by(&self, dy: u32) -> Result<()>;

    /// Total scrollable height of the document in pixels
    async fn scroll_height(&self) -> Result<u64>;

    async fn cookies(&self) -> Result<Vec<StoredCookie>>;

    async fn set_cookies(&self, cookies: &[StoredCookie]) -> Result<()>;

    /// Save a full-page PNG screenshot
    async fn screenshot(&self, path: &Path) -> Result<()>;
}
