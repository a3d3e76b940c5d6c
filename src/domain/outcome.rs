use std::fmt;
use std::path::PathBuf;

use crate::domain::Target;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    PartialSuccess,
    Failure,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutcomeStatus::Success => "success",
            OutcomeStatus::PartialSuccess => "partial",
            OutcomeStatus::Failure => "failure",
        };
        f.write_str(s)
    }
}

/// Terminal result for one target. Never mutated once appended to a run.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub target: Target,
    pub status: OutcomeStatus,
    pub detail: String,
    pub content_length: Option<usize>,
    /// Where the document was written, if it was.
    pub path: Option<PathBuf>,
}

impl Outcome {
    pub fn success(target: Target, content_length: usize, path: PathBuf) -> Self {
        Self {
            target,
            status: OutcomeStatus::Success,
            detail: format!("saved to {}", path.display()),
            content_length: Some(content_length),
            path: Some(path),
        }
    }

    pub fn partial(
        target: Target,
        content_length: usize,
        path: PathBuf,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            target,
            status: OutcomeStatus::PartialSuccess,
            detail: reason.into(),
            content_length: Some(content_length),
            path: Some(path),
        }
    }

    pub fn failure(target: Target, detail: impl Into<String>) -> Self {
        Self {
            target,
            status: OutcomeStatus::Failure,
            detail: detail.into(),
            content_length: None,
            path: None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == OutcomeStatus::Failure
    }
}

/// Counts by status over a run's outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub partial: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[Outcome]) -> Self {
        outcomes.iter().fold(
            Self {
                total: outcomes.len(),
                ..Default::default()
            },
            |mut summary, outcome| {
                match outcome.status {
                    OutcomeStatus::Success => summary.succeeded += 1,
                    OutcomeStatus::PartialSuccess => summary.partial += 1,
                    OutcomeStatus::Failure => summary.failed += 1,
                }
                summary
            },
        )
    }

    /// Targets that produced a document, full or partial.
    pub fn saved(&self) -> usize {
        self.succeeded + self.partial
    }
}
