//! Configuration management for Scrivener.
//!
//! Configuration is read from `~/.config/scrivener/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod duration;

pub use duration::{format_duration, parse_duration};

use crate::app::Result as AppResult;
use crate::domain::Target;
use crate::scraper::{ClassifierConfig, InteractionConfig, ScraperConfig, SessionConfig};
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub session: SessionConfig,
    pub interaction: InteractionConfig,
    pub classifier: ClassifierConfig,
    pub output: OutputConfig,
    pub targets: Vec<TargetConfig>,
}

/// Where scraped documents are written
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("scraped-articles"),
        }
    }
}

/// One `[[targets]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    pub id: String,
    pub url: String,
}

impl Config {
    /// Load configuration from `path`.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/scrivener/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("scrivener").join("config.toml"))
    }

    /// Write the commented default config unless a file already exists.
    /// Returns whether a file was created.
    pub fn init(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }
        Self::create_default_config(path)?;
        Ok(true)
    }

    /// Configured targets in order, with their locators validated
    pub fn targets(&self) -> AppResult<Vec<Target>> {
        self.targets
            .iter()
            .map(|t| Target::new(t.id.clone(), &t.url))
            .collect()
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Scrivener Configuration
#
# Durations given on the command line accept "30s", "5m", "1h", "1d"
# or a raw number of seconds.

[scraper]
# Keep the browser visible so you can log in and solve verification pages
headless = false

# Browser viewport in pixels
viewport_width = 1400
viewport_height = 900

# Navigation timeout in seconds
navigation_timeout_secs = 60

# Wait after each navigation for the first render (milliseconds)
settle_delay_ms = 3000

# Incremental scrolling used to trigger lazy-loaded content
scroll_step_px = 200
scroll_interval_ms = 100
max_scroll_iterations = 200
trailing_pause_ms = 1000

# Pause between articles, and before the browser closes (milliseconds)
between_targets_ms = 1000
close_delay_ms = 0

# Save a full-page screenshot next to the output when an article fails
screenshot_on_error = true

# CSS selectors to try for the article body (in priority order)
content_selectors = [
    "article",
    "[data-testid=\"article-content\"]",
    ".postArticle-content",
    "section[data-field=\"body\"]",
    "div[class*=\"article\"]",
]
title_selector = "h1"
author_selectors = ["[rel=\"author\"]", "[data-testid=\"authorName\"]"]
reading_time_selector = "[data-testid=\"storyReadTime\"]"

# Short bodies (in characters) carrying one of these markers are saved as partial
paywall_markers = ["Member-only story", "Become a member to read"]
partial_threshold = 2000

[session]
# fresh, cookie_file or profile
strategy = "cookie_file"
# cookie_file = "/path/to/session.json"
# profile_dir = "/path/to/profile"
landing_url = "https://medium.com/"
authenticated_selectors = ["[data-testid=\"user-menu\"]", "[aria-label=\"user menu\"]"]
authenticated_phrases = ["Your library"]

[interaction]
# silent: never pause, guided: pause for login and challenges,
# manual: also pause on every article
mode = "guided"
# signal: wait for ENTER, timer: wait fixed_delay_secs
wait = "signal"
# Longest wait for ENTER in seconds, 0 waits indefinitely
signal_ceiling_secs = 0
fixed_delay_secs = 60

[classifier]
# Matched as substrings of the page text, first rule wins
challenge_markers = ["Verifying you are human", "Cloudflare"]
access_denied_markers = ["Member-only story", "Become a member to read"]
server_error_markers = ["500", "something went wrong"]
# Set to false to ignore case when matching markers
case_sensitive = true

[output]
dir = "scraped-articles"

# Articles to scrape, processed in order
# [[targets]]
# id = "01-first-article.md"
# url = "https://medium.com/@author/first-article"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
