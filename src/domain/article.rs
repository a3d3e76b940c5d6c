/// Fields pulled from a rendered article page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArticle {
    pub title: String,
    pub author: String,
    pub body: String,
    pub reading_time: Option<String>,
    pub is_partial: bool,
}

impl ExtractedArticle {
    /// Body length in characters, as reported in outcomes.
    pub fn content_length(&self) -> usize {
        self.body.chars().count()
    }

    /// First `max` characters of the body, for progress previews.
    pub fn preview(&self, max: usize) -> &str {
        match self.body.char_indices().nth(max) {
            Some((idx, _)) => &self.body[..idx],
            None => &self.body,
        }
    }
}
