//! Scripted [`BrowserPage`] for exercising the pipeline without a browser.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::app::{Result, ScrivenerError};
use crate::scraper::{BrowserPage, StoredCookie};

#[derive(Debug, Clone)]
pub enum HeightModel {
    Fixed(u64),
    /// Grows on every read, never settles
    Growing { start: u64, per_read: u64 },
    /// One value per read; the last value repeats
    Sequence(Vec<u64>),
}

/// What a URL renders as
#[derive(Debug, Clone)]
pub struct Fixture {
    pub title: String,
    /// Body text returned by successive reads; the last one repeats
    pub bodies: Vec<String>,
    pub selectors: HashMap<String, String>,
    pub heights: HeightModel,
    pub goto_delay: Option<Duration>,
    pub goto_error: Option<String>,
}

impl Fixture {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            bodies: vec![body.into()],
            selectors: HashMap::new(),
            heights: HeightModel::Fixed(800),
            goto_delay: None,
            goto_error: None,
        }
    }

    pub fn then_body(mut self, body: impl Into<String>) -> Self {
        self.bodies.push(body.into());
        self
    }

    pub fn with(mut self, selector: &str, text: impl Into<String>) -> Self {
        self.selectors.insert(selector.to_string(), text.into());
        self
    }

    pub fn heights(mut self, heights: HeightModel) -> Self {
        self.heights = heights;
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.goto_delay = Some(delay);
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.goto_error = Some(message.to_string());
        self
    }
}

#[derive(Default)]
struct MockState {
    current: Option<Fixture>,
    visited: Vec<String>,
    body_reads: usize,
    height_reads: usize,
    scrolls: usize,
    restored: Vec<StoredCookie>,
    screenshots: Vec<PathBuf>,
}

pub struct MockPage {
    fixtures: HashMap<String, Fixture>,
    fallback: Fixture,
    browser_cookies: Vec<StoredCookie>,
    reject_cookies: bool,
    state: Mutex<MockState>,
}

impl MockPage {
    pub fn new() -> Self {
        Self {
            fixtures: HashMap::new(),
            fallback: Fixture::new(""),
            browser_cookies: Vec::new(),
            reject_cookies: false,
            state: Mutex::new(MockState::default()),
        }
    }

    /// A page that is already showing `fixture`
    pub fn showing(fixture: Fixture) -> Self {
        let page = Self::new();
        page.state.lock().unwrap().current = Some(fixture);
        page
    }

    pub fn route(mut self, url: &str, fixture: Fixture) -> Self {
        self.fixtures.insert(url.to_string(), fixture);
        self
    }

    pub fn with_browser_cookies(mut self, cookies: Vec<StoredCookie>) -> Self {
        self.browser_cookies = cookies;
        self
    }

    pub fn rejecting_cookies(mut self) -> Self {
        self.reject_cookies = true;
        self
    }

    pub fn visited(&self) -> Vec<String> {
        self.state.lock().unwrap().visited.clone()
    }

    pub fn scrolls(&self) -> usize {
        self.state.lock().unwrap().scrolls
    }

    pub fn restored_cookies(&self) -> Vec<StoredCookie> {
        self.state.lock().unwrap().restored.clone()
    }

    pub fn screenshots(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().screenshots.clone()
    }

    fn current(&self) -> Fixture {
        self.state
            .lock()
            .unwrap()
            .current
            .clone()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl BrowserPage for MockPage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.state.lock().unwrap().visited.push(url.to_string());
        let fixture = self
            .fixtures
            .get(url)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone());

        if let Some(delay) = fixture.goto_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(ref message) = fixture.goto_error {
            return Err(ScrivenerError::Browser(message.clone()));
        }

        let mut state = self.state.lock().unwrap();
        state.current = Some(fixture);
        state.body_reads = 0;
        state.height_reads = 0;
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        Ok(self.current().title)
    }

    async fn body_text(&self) -> Result<String> {
        let fixture = self.current();
        let mut state = self.state.lock().unwrap();
        let idx = state.body_reads.min(fixture.bodies.len().saturating_sub(1));
        state.body_reads += 1;
        Ok(fixture.bodies.get(idx).cloned().unwrap_or_default())
    }

    async fn query_text(&self, selector: &str) -> Result<Option<String>> {
        Ok(self.current().selectors.get(selector).cloned())
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        Ok(self.current().selectors.contains_key(selector))
    }

    async fn scroll_by(&self, _dy: u32) -> Result<()> {
        self.state.lock().unwrap().scrolls += 1;
        Ok(())
    }

    async fn scroll_height(&self) -> Result<u64> {
        let fixture = self.current();
        let mut state = self.state.lock().unwrap();
        let read = state.height_reads;
        state.height_reads += 1;
        Ok(match fixture.heights {
            HeightModel::Fixed(h) => h,
            HeightModel::Growing { start, per_read } => start + per_read * read as u64,
            HeightModel::Sequence(ref values) => values
                .get(read.min(values.len().saturating_sub(1)))
                .copied()
                .unwrap_or(0),
        })
    }

    async fn cookies(&self) -> Result<Vec<StoredCookie>> {
        Ok(self.browser_cookies.clone())
    }

    async fn set_cookies(&self, cookies: &[StoredCookie]) -> Result<()> {
        if self.reject_cookies {
            return Err(ScrivenerError::Browser("cookies rejected".into()));
        }
        self.state.lock().unwrap().restored = cookies.to_vec();
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .screenshots
            .push(path.to_path_buf());
        Ok(())
    }
}
