use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::app::{Result, ScrivenerError};
use crate::scraper::session::SessionStrategy;
use crate::scraper::wait::{InteractionMode, WaitStrategy};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Configuration for the browser and the per-target pipeline stages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Whether to run the browser in headless mode (default: false, so a
    /// human can log in and solve challenges)
    pub headless: bool,

    /// User agent string to use
    pub user_agent: Option<String>,

    /// Browser viewport size in pixels (default: 1400x900)
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Navigation timeout in seconds (default: 60)
    pub navigation_timeout_secs: u64,

    /// Fixed wait after navigation for first-pass rendering in milliseconds (default: 3000)
    pub settle_delay_ms: u64,

    /// Scroll advance per step in pixels (default: 200)
    pub scroll_step_px: u32,

    /// Pause between scroll steps in milliseconds (default: 100)
    pub scroll_interval_ms: u64,

    /// Upper bound on scroll steps per page (default: 200)
    pub max_scroll_iterations: usize,

    /// Pause after scrolling stops, for trailing lazy content (default: 1000)
    pub trailing_pause_ms: u64,

    /// Delay between targets in milliseconds (default: 1000)
    pub between_targets_ms: u64,

    /// Delay before the browser is closed at the end of a run (default: 0)
    pub close_delay_ms: u64,

    /// Save a full-page screenshot when a target fails (default: true)
    pub screenshot_on_error: bool,

    /// CSS selectors for the article root, in priority order
    pub content_selectors: Vec<String>,

    /// CSS selector for the article title
    pub title_selector: String,

    /// CSS selectors that carry the author name, in priority order
    pub author_selectors: Vec<String>,

    /// CSS selector for the reading time label
    pub reading_time_selector: String,

    /// Text that marks a paywalled body
    pub paywall_markers: Vec<String>,

    /// Bodies shorter than this (in characters) that carry a paywall
    /// marker are flagged partial (default: 2000)
    pub partial_threshold: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: false,
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            viewport_width: 1400,
            viewport_height: 900,
            navigation_timeout_secs: 60,
            settle_delay_ms: 3000,
            scroll_step_px: 200,
            scroll_interval_ms: 100,
            max_scroll_iterations: 200,
            trailing_pause_ms: 1000,
            between_targets_ms: 1000,
            close_delay_ms: 0,
            screenshot_on_error: true,
            content_selectors: strings(&[
                "article",
                "[data-testid=\"article-content\"]",
                ".postArticle-content",
                "section[data-field=\"body\"]",
                "div[class*=\"article\"]",
            ]),
            title_selector: "h1".to_string(),
            author_selectors: strings(&["[rel=\"author\"]", "[data-testid=\"authorName\"]"]),
            reading_time_selector: "[data-testid=\"storyReadTime\"]".to_string(),
            paywall_markers: strings(&["Member-only story", "Become a member to read"]),
            partial_threshold: 2000,
        }
    }
}

impl ScraperConfig {
    /// Get the navigation timeout as a Duration
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn scroll_interval(&self) -> Duration {
        Duration::from_millis(self.scroll_interval_ms)
    }

    pub fn trailing_pause(&self) -> Duration {
        Duration::from_millis(self.trailing_pause_ms)
    }

    pub fn between_targets(&self) -> Duration {
        Duration::from_millis(self.between_targets_ms)
    }

    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }

    /// A config with every delay zeroed, for scripted pages
    pub fn immediate() -> Self {
        Self {
            settle_delay_ms: 0,
            scroll_interval_ms: 0,
            trailing_pause_ms: 0,
            between_targets_ms: 0,
            close_delay_ms: 0,
            screenshot_on_error: false,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStrategyKind {
    /// Start from a clean browser every run
    Fresh,
    /// Restore and save a cookie snapshot file
    CookieFile,
    /// Reuse a persistent browser profile directory
    Profile,
}

/// How the authenticated session is restored and kept between runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub strategy: SessionStrategyKind,

    /// Cookie snapshot path (default: `<data_dir>/scrivener/session.json`)
    pub cookie_file: Option<PathBuf>,

    /// Browser profile path (default: `<data_dir>/scrivener/profile`)
    pub profile_dir: Option<PathBuf>,

    /// Page used to check the login state
    pub landing_url: String,

    /// Elements that only render for a logged-in user
    pub authenticated_selectors: Vec<String>,

    /// Body text that only renders for a logged-in user
    pub authenticated_phrases: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            strategy: SessionStrategyKind::CookieFile,
            cookie_file: None,
            profile_dir: None,
            landing_url: "https://medium.com/".to_string(),
            authenticated_selectors: strings(&[
                "[data-testid=\"user-menu\"]",
                "[aria-label=\"user menu\"]",
            ]),
            authenticated_phrases: strings(&["Your library"]),
        }
    }
}

impl SessionConfig {
    /// Resolve the configured strategy, filling in default paths
    pub fn strategy(&self) -> Result<SessionStrategy> {
        match self.strategy {
            SessionStrategyKind::Fresh => Ok(SessionStrategy::Fresh),
            SessionStrategyKind::CookieFile => {
                let path = match &self.cookie_file {
                    Some(p) => p.clone(),
                    None => Self::data_dir()?.join("session.json"),
                };
                Ok(SessionStrategy::CookieFile(path))
            }
            SessionStrategyKind::Profile => {
                let path = match &self.profile_dir {
                    Some(p) => p.clone(),
                    None => Self::data_dir()?.join("profile"),
                };
                Ok(SessionStrategy::Profile(path))
            }
        }
    }

    fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| ScrivenerError::Config("Could not find data directory".into()))?;
        Ok(data_dir.join("scrivener"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitKind {
    /// Block until ENTER is pressed (bounded by the ceiling, if set)
    Signal,
    /// Sleep for a fixed delay
    Timer,
}

/// Human-in-the-loop behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub mode: InteractionMode,
    pub wait: WaitKind,

    /// Longest wait for a signal in seconds; 0 waits indefinitely
    pub signal_ceiling_secs: u64,

    /// Delay used by the timer wait in seconds (default: 60)
    pub fixed_delay_secs: u64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            mode: InteractionMode::Guided,
            wait: WaitKind::Signal,
            signal_ceiling_secs: 0,
            fixed_delay_secs: 60,
        }
    }
}

impl InteractionConfig {
    pub fn wait_strategy(&self) -> WaitStrategy {
        match self.wait {
            WaitKind::Signal => WaitStrategy::WaitForSignal {
                ceiling: (self.signal_ceiling_secs > 0)
                    .then(|| Duration::from_secs(self.signal_ceiling_secs)),
            },
            WaitKind::Timer => WaitStrategy::FixedDelay(Duration::from_secs(self.fixed_delay_secs)),
        }
    }
}

/// Page classification markers, matched as substrings of the body text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub challenge_markers: Vec<String>,
    pub access_denied_markers: Vec<String>,
    pub server_error_markers: Vec<String>,

    /// Match markers with case taken into account (default: true)
    pub case_sensitive: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            challenge_markers: strings(&["Verifying you are human", "Cloudflare"]),
            access_denied_markers: strings(&["Member-only story", "Become a member to read"]),
            server_error_markers: strings(&["500", "something went wrong"]),
            case_sensitive: true,
        }
    }
}
