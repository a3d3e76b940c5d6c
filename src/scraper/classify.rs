use crate::domain::PageState;
use crate::scraper::config::ClassifierConfig;

/// A page state and the body-text markers that select it
#[derive(Debug, Clone)]
pub struct ClassificationRule {
    state: PageState,
    markers: Vec<String>,
}

impl ClassificationRule {
    pub fn new<I, S>(state: PageState, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            state,
            markers: markers
                .into_iter()
                .map(|m| m.as_ref().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    /// `lowered` is the lowercased text when matching ignores case
    fn matches(&self, text: &str, lowered: Option<&str>) -> bool {
        match lowered {
            None => self.markers.iter().any(|m| text.contains(m.as_str())),
            Some(lowered) => self
                .markers
                .iter()
                .any(|m| lowered.contains(m.to_lowercase().as_str())),
        }
    }
}

/// Ordered rules; the first rule with a matching marker decides the state.
/// Text matching no rule is [`PageState::Ok`]. Markers match case-sensitively
/// unless the table is built otherwise.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<ClassificationRule>,
    case_sensitive: bool,
}

impl RuleTable {
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self {
            rules,
            case_sensitive: true,
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(vec![
            ClassificationRule::new(PageState::Challenge, &config.challenge_markers),
            ClassificationRule::new(PageState::AccessDenied, &config.access_denied_markers),
            ClassificationRule::new(PageState::ServerError, &config.server_error_markers),
        ])
        .case_sensitive(config.case_sensitive)
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Append a rule at the lowest priority
    pub fn push(&mut self, rule: ClassificationRule) {
        self.rules.push(rule);
    }

    pub fn classify(&self, body_text: &str) -> PageState {
        let lowered = (!self.case_sensitive).then(|| body_text.to_lowercase());
        self.rules
            .iter()
            .find(|rule| rule.matches(body_text, lowered.as_deref()))
            .map(ClassificationRule::state)
            .unwrap_or(PageState::Ok)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::from_config(&ClassifierConfig::default())
    }
}
