use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{error, info};

use crate::app::ScrivenerError;
use crate::domain::{ExtractedArticle, Outcome, Target};
use crate::store::DocumentStore;

/// Render the article document.
///
/// ```text
/// # <title>
///
/// **Author:** <author>
/// **URL:** <locator>
/// **Scraped:** <timestamp>
/// **Reading Time:** <label>
///
/// ---
///
/// <body>
/// ```
///
/// The reading time line is left out entirely when there is no label.
pub fn format_document(
    target: &Target,
    article: &ExtractedArticle,
    scraped_at: DateTime<Utc>,
) -> String {
    let mut doc = format!(
        "# {}\n\n**Author:** {}\n**URL:** {}\n**Scraped:** {}\n",
        article.title,
        article.author,
        target.url(),
        scraped_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    );
    if let Some(ref label) = article.reading_time {
        doc.push_str(&format!("**Reading Time:** {}\n", label));
    }
    doc.push_str("\n---\n\n");
    doc.push_str(&article.body);
    doc.push('\n');
    doc
}

/// Formats and persists articles, turning every result into an [`Outcome`]
pub struct DocumentWriter<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> DocumentWriter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn write(&self, target: &Target, article: &ExtractedArticle) -> Outcome {
        self.write_at(target, article, Utc::now())
    }

    pub fn write_at(
        &self,
        target: &Target,
        article: &ExtractedArticle,
        scraped_at: DateTime<Utc>,
    ) -> Outcome {
        let document = format_document(target, article, scraped_at);
        let length = article.content_length();

        match self.store.persist(&target.id, &document) {
            Ok(path) if article.is_partial => {
                let reason = ScrivenerError::AccessDenied(target.url().to_string()).to_string();
                info!("Saved partial article to {}", path.display());
                Outcome::partial(target.clone(), length, path, reason)
            }
            Ok(path) => {
                info!("Saved to {}", path.display());
                Outcome::success(target.clone(), length, path)
            }
            Err(e) => {
                error!("Failed to save {}: {}", target.id, e);
                Outcome::failure(target.clone(), e.to_string())
            }
        }
    }
}
