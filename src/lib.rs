//! # Scrivener
//!
//! Saves Medium articles as Markdown by driving a real Chrome window.
//!
//! ## Architecture
//!
//! One browser, one page and one session serve a whole run. Each target
//! flows strictly forward through the pipeline:
//!
//! ```text
//! Session (once) → Navigate → Classify → Settle → Extract → Write → Outcome
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Write ~/.config/scrivener/config.toml and add [[targets]] to it
//! scrivener init
//!
//! # Log in once and keep the session
//! scrivener login
//!
//! # Scrape every configured target
//! scrivener run
//!
//! # Scrape one article
//! scrivener scrape https://medium.com/@author/some-story story.md
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Application context and error types
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: TOML configuration
//! - [`domain`]: Targets, articles, page states and outcomes
//! - [`runner`]: Run orchestration
//! - [`scraper`]: Browser-driven pipeline stages
//! - [`store`]: Document formatting and persistence

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires the loaded configuration
/// into a [`Runner`](runner::Runner).
pub mod app;

/// Command-line interface using clap.
///
/// - `run` - Scrape every configured target
/// - `scrape <url> [output-id]` - Scrape one article
/// - `login` - Establish and save the session
/// - `targets` - List configured targets
/// - `init` - Write the default config
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/scrivener/config.toml`; every field has a default.
pub mod config;

/// Core domain models.
pub mod domain;

/// Run orchestration: session once, then each target in order.
pub mod runner;

/// Browser-driven extraction pipeline.
///
/// - [`BrowserPage`](scraper::BrowserPage): The page operations every stage uses
/// - [`ChromeBrowser`](scraper::ChromeBrowser): chromiumoxide-backed browser
/// - [`SessionManager`](scraper::SessionManager): Restores, checks and saves the login
/// - [`Navigator`](scraper::Navigator): Navigation with timeout and page classification
/// - [`Settler`](scraper::Settler): Scrolls until lazy content stops loading
/// - [`ContentExtractor`](scraper::ContentExtractor): Title, author, body and reading time
pub mod scraper;

/// Markdown document formatting and file persistence.
pub mod store;
