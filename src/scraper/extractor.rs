use tracing::debug;

use crate::app::{Result, ScrivenerError};
use crate::domain::ExtractedArticle;
use crate::scraper::{BrowserPage, ScraperConfig};

/// Pulls article fields out of a rendered page
pub struct ContentExtractor {
    config: ScraperConfig,
}

impl ContentExtractor {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    /// Extract the article from the page.
    ///
    /// The body comes from the first content selector that matches with
    /// visible text, falling back to the whole page body. Title, author and
    /// reading time are best-effort and default to empty.
    pub async fn extract<P: BrowserPage + ?Sized>(&self, page: &P) -> Result<ExtractedArticle> {
        let body = self.find_body(page).await?;
        if body.trim().is_empty() {
            return Err(ScrivenerError::ExtractionEmpty(
                "no content container matched and the page body is empty".to_string(),
            ));
        }

        let title = page
            .query_text(&self.config.title_selector)
            .await?
            .map(|t| t.trim().to_string())
            .unwrap_or_default();

        let author = self.first_text(page, &self.config.author_selectors).await?;

        let reading_time = page
            .query_text(&self.config.reading_time_selector)
            .await?
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let is_partial = self.is_partial(&body);

        Ok(ExtractedArticle {
            title,
            author,
            body,
            reading_time,
            is_partial,
        })
    }

    /// Whether a body is a paywall preview: it carries a paywall marker and
    /// is shorter than the threshold. Both must hold, since logged-in members
    /// still see the marker above the full story.
    pub fn is_partial(&self, body: &str) -> bool {
        let has_marker = self
            .config
            .paywall_markers
            .iter()
            .any(|m| !m.is_empty() && body.contains(m.as_str()));
        has_marker && body.chars().count() < self.config.partial_threshold
    }

    async fn find_body<P: BrowserPage + ?Sized>(&self, page: &P) -> Result<String> {
        for selector in &self.config.content_selectors {
            if let Some(text) = page.query_text(selector).await? {
                if !text.trim().is_empty() {
                    debug!("Found content using selector: {}", selector);
                    return Ok(text);
                }
            }
        }

        debug!("No content selector matched, using the page body");
        page.body_text().await
    }

    async fn first_text<P: BrowserPage + ?Sized>(
        &self,
        page: &P,
        selectors: &[String],
    ) -> Result<String> {
        for selector in selectors {
            if let Some(text) = page.query_text(selector).await? {
                let text = text.trim();
                if !text.is_empty() {
                    return Ok(text.to_string());
                }
            }
        }
        Ok(String::new())
    }
}
