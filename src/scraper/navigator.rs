use std::time::Duration;

use tracing::{info, warn};

use crate::app::{Result, ScrivenerError};
use crate::domain::PageState;
use crate::scraper::{BrowserPage, HumanLoop, RuleTable, ScraperConfig};

#[derive(Debug, Clone)]
pub struct NavigationPolicy {
    /// Bound on reaching a parsed document
    pub timeout: Duration,
    /// Fixed pause after navigation for first-pass rendering
    pub settle_delay: Duration,
}

impl NavigationPolicy {
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            timeout: config.navigation_timeout(),
            settle_delay: config.settle_delay(),
        }
    }
}

/// Drives the page to a locator and classifies what it landed on.
pub struct Navigator {
    policy: NavigationPolicy,
    rules: RuleTable,
}

impl Navigator {
    pub fn new(policy: NavigationPolicy, rules: RuleTable) -> Self {
        Self { policy, rules }
    }

    /// Navigate and classify. A challenge is handed to the human once when
    /// the interaction mode allows it, then re-classified; it is never
    /// retried beyond that.
    pub async fn navigate<P: BrowserPage + ?Sized>(
        &self,
        page: &P,
        locator: &str,
        human: &HumanLoop,
    ) -> Result<PageState> {
        self.goto(page, locator).await?;

        let state = self.classify(page).await?;
        if state != PageState::Challenge || !human.is_interactive() {
            return Ok(state);
        }

        warn!("Bot verification detected on {}", locator);
        human
            .pause("Verification challenge detected. Please solve it in the browser window.")
            .await;

        let state = self.classify(page).await?;
        if state == PageState::Challenge {
            warn!("Still showing the verification challenge");
        }
        Ok(state)
    }

    /// Navigate within the timeout, then wait the fixed settle delay
    pub async fn goto<P: BrowserPage + ?Sized>(&self, page: &P, locator: &str) -> Result<()> {
        info!("Loading: {}", locator);

        match tokio::time::timeout(self.policy.timeout, page.goto(locator)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ScrivenerError::NavigationTimeout {
                    url: locator.to_string(),
                    timeout_secs: self.policy.timeout.as_secs(),
                })
            }
        }

        tokio::time::sleep(self.policy.settle_delay).await;

        match page.title().await {
            Ok(title) if !title.is_empty() => info!("Page title: {}", title),
            Ok(_) => {}
            Err(e) => warn!("Could not read page title: {}", e),
        }
        Ok(())
    }

    pub async fn classify<P: BrowserPage + ?Sized>(&self, page: &P) -> Result<PageState> {
        let text = page.body_text().await?;
        Ok(self.rules.classify(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::testing::{Fixture, MockPage};
    use crate::scraper::{InteractionMode, WaitStrategy};

    const URL: &str = "https://medium.com/@a/story-1";

    fn navigator(timeout: Duration) -> Navigator {
        Navigator::new(
            NavigationPolicy {
                timeout,
                settle_delay: Duration::ZERO,
            },
            RuleTable::default(),
        )
    }

    fn guided() -> HumanLoop {
        HumanLoop::new(InteractionMode::Guided, WaitStrategy::Immediate)
    }

    #[tokio::test]
    async fn test_ok_page() {
        let page = MockPage::new().route(URL, Fixture::new("A normal story about Rust."));
        let state = navigator(Duration::from_secs(5))
            .navigate(&page, URL, &HumanLoop::silent())
            .await
            .unwrap();
        assert_eq!(state, PageState::Ok);
        assert_eq!(page.visited(), vec![URL.to_string()]);
    }

    #[tokio::test]
    async fn test_timeout_is_navigation_timeout() {
        let page = MockPage::new().route(
            URL,
            Fixture::new("late").slow(Duration::from_millis(500)),
        );
        let err = navigator(Duration::from_millis(20))
            .navigate(&page, URL, &HumanLoop::silent())
            .await
            .unwrap_err();
        assert!(matches!(err, ScrivenerError::NavigationTimeout { .. }));
    }

    #[tokio::test]
    async fn test_browser_error_propagates() {
        let page = MockPage::new().route(URL, Fixture::new("").failing("net::ERR_NAME_NOT_RESOLVED"));
        let err = navigator(Duration::from_secs(5))
            .navigate(&page, URL, &HumanLoop::silent())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ERR_NAME_NOT_RESOLVED"));
    }

    #[tokio::test]
    async fn test_challenge_in_silent_mode_is_not_retried() {
        let page = MockPage::new().route(
            URL,
            Fixture::new("Verifying you are human").then_body("Story text"),
        );
        let state = navigator(Duration::from_secs(5))
            .navigate(&page, URL, &HumanLoop::silent())
            .await
            .unwrap();
        assert_eq!(state, PageState::Challenge);
    }

    #[tokio::test]
    async fn test_challenge_resolved_by_human_is_reclassified() {
        let page = MockPage::new().route(
            URL,
            Fixture::new("Verifying you are human").then_body("Story text"),
        );
        let state = navigator(Duration::from_secs(5))
            .navigate(&page, URL, &guided())
            .await
            .unwrap();
        assert_eq!(state, PageState::Ok);
    }

    #[tokio::test]
    async fn test_unresolved_challenge_reclassified_once() {
        let page = MockPage::new().route(URL, Fixture::new("Verifying you are human"));
        let state = navigator(Duration::from_secs(5))
            .navigate(&page, URL, &guided())
            .await
            .unwrap();
        assert_eq!(state, PageState::Challenge);
        assert_eq!(page.visited().len(), 1);
    }

    #[tokio::test]
    async fn test_paywall_page_is_access_denied() {
        let page = MockPage::new().route(URL, Fixture::new("Member-only story\nThe first lines"));
        let state = navigator(Duration::from_secs(5))
            .navigate(&page, URL, &guided())
            .await
            .unwrap();
        assert_eq!(state, PageState::AccessDenied);
    }
}
