use std::fmt;

use url::Url;

use crate::app::Result;

/// One unit of work for a run: a page locator plus the identifier its
/// document is persisted under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub id: String,
    pub locator: Url,
}

impl Target {
    pub fn new(id: impl Into<String>, locator: &str) -> Result<Self> {
        Ok(Self {
            id: id.into(),
            locator: Url::parse(locator)?,
        })
    }

    /// Identifier used when the caller does not assign one.
    pub fn generated_id() -> String {
        format!("medium-article-{}.md", chrono::Utc::now().timestamp_millis())
    }

    pub fn url(&self) -> &str {
        self.locator.as_str()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.locator)
    }
}
