use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::app::{Result, ScrivenerError};
use crate::scraper::{BrowserPage, HumanLoop, Navigator, SessionConfig};

/// A browser cookie in the `{ "cookies": [...] }` snapshot format
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// Seconds since the epoch; absent or negative for session cookies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

fn default_path() -> String {
    "/".to_string()
}

// Cookie values are credentials and stay out of logs.
impl fmt::Debug for StoredCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCookie")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Persisted session artifact
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub cookies: Vec<StoredCookie>,
}

impl SessionSnapshot {
    /// Read a snapshot. A missing file is `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        let snapshot = serde_json::from_str(&content)?;
        Ok(Some(snapshot))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let persistence = |source| ScrivenerError::Persistence {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(persistence)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(persistence)?;
        Ok(())
    }
}

/// Where session state lives between runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStrategy {
    Fresh,
    CookieFile(PathBuf),
    Profile(PathBuf),
}

impl SessionStrategy {
    /// Profile directory the browser must be launched with, if any
    pub fn profile_dir(&self) -> Option<&Path> {
        match self {
            SessionStrategy::Profile(dir) => Some(dir),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Credentials {
    None,
    Cookies(Vec<StoredCookie>),
    Profile(PathBuf),
}

/// Browsing context shared by every target of a run
#[derive(Debug, Clone)]
pub struct Session {
    pub credentials: Credentials,
    pub authenticated: bool,
}

impl Session {
    pub fn unauthenticated() -> Self {
        Self {
            credentials: Credentials::None,
            authenticated: false,
        }
    }
}

/// Establishes the run's session and owns the logged-in predicate
pub struct SessionManager {
    strategy: SessionStrategy,
    landing_url: String,
    authenticated_selectors: Vec<String>,
    authenticated_phrases: Vec<String>,
}

impl SessionManager {
    pub fn new(config: &SessionConfig) -> Result<Self> {
        Ok(Self::with_strategy(config.strategy()?, config))
    }

    pub fn with_strategy(strategy: SessionStrategy, config: &SessionConfig) -> Self {
        Self {
            strategy,
            landing_url: config.landing_url.clone(),
            authenticated_selectors: config.authenticated_selectors.clone(),
            authenticated_phrases: config.authenticated_phrases.clone(),
        }
    }

    pub fn strategy(&self) -> &SessionStrategy {
        &self.strategy
    }

    /// Restore saved state, check the login on the landing page and, if
    /// logged out, wait for a human to log in before saving the new state.
    ///
    /// Only a failure to load the landing page is an error. Authentication
    /// itself is best-effort.
    pub async fn establish<P: BrowserPage + ?Sized>(
        &self,
        page: &P,
        navigator: &Navigator,
        human: &HumanLoop,
    ) -> Result<Session> {
        let mut credentials = self.restore(page).await;

        info!("Checking login status...");
        navigator.goto(page, &self.landing_url).await?;

        if self.is_authenticated(page).await {
            info!("Already logged in");
            return Ok(Session {
                credentials,
                authenticated: true,
            });
        }

        warn!("Not logged in");
        if human.pause("Please log in in the browser window.").await.is_none() {
            return Ok(Session {
                credentials,
                authenticated: false,
            });
        }

        let authenticated = self.is_authenticated(page).await;
        if authenticated {
            info!("Login confirmed");
        } else {
            warn!("Still not logged in, continuing without authentication");
        }
        credentials = self.persist(page, credentials).await;

        Ok(Session {
            credentials,
            authenticated,
        })
    }

    /// Evaluated against the live page every time; restored cookies can be
    /// rejected server-side without any local signal.
    pub async fn is_authenticated<P: BrowserPage + ?Sized>(&self, page: &P) -> bool {
        for selector in &self.authenticated_selectors {
            match page.exists(selector).await {
                Ok(true) => return true,
                Ok(false) => {}
                Err(e) => warn!("Login check on {} failed: {}", selector, e),
            }
        }

        match page.body_text().await {
            Ok(text) => self
                .authenticated_phrases
                .iter()
                .any(|phrase| text.contains(phrase.as_str())),
            Err(e) => {
                warn!("Login check on page text failed: {}", e);
                false
            }
        }
    }

    async fn restore<P: BrowserPage + ?Sized>(&self, page: &P) -> Credentials {
        match &self.strategy {
            SessionStrategy::Fresh => Credentials::None,
            SessionStrategy::Profile(dir) => {
                info!("Using browser profile at {}", dir.display());
                Credentials::Profile(dir.clone())
            }
            SessionStrategy::CookieFile(path) => match SessionSnapshot::load(path) {
                Ok(Some(snapshot)) => match page.set_cookies(&snapshot.cookies).await {
                    Ok(()) => {
                        info!(
                            "Loaded {} saved cookies from {}",
                            snapshot.cookies.len(),
                            path.display()
                        );
                        Credentials::Cookies(snapshot.cookies)
                    }
                    Err(e) => {
                        warn!("Could not apply saved session: {}", e);
                        Credentials::None
                    }
                },
                Ok(None) => {
                    info!("No saved session at {}", path.display());
                    Credentials::None
                }
                Err(e) => {
                    warn!(
                        "Could not load saved session from {}: {}. Continuing unauthenticated",
                        path.display(),
                        e
                    );
                    Credentials::None
                }
            },
        }
    }

    async fn persist<P: BrowserPage + ?Sized>(&self, page: &P, current: Credentials) -> Credentials {
        let SessionStrategy::CookieFile(path) = &self.strategy else {
            // A profile directory is written by the browser itself
            return current;
        };

        let cookies = match page.cookies().await {
            Ok(cookies) => cookies,
            Err(e) => {
                warn!("Could not read cookies to save the session: {}", e);
                return current;
            }
        };

        let snapshot = SessionSnapshot { cookies };
        match snapshot.save(path) {
            Ok(()) => info!("Session saved to {}", path.display()),
            Err(e) => warn!("{}. Keeping the session in memory only", e),
        }
        Credentials::Cookies(snapshot.cookies)
    }
}
