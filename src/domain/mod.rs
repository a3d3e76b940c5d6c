pub mod article;
pub mod outcome;
pub mod page_state;
pub mod target;

pub use article::ExtractedArticle;
pub use outcome::{Outcome, OutcomeStatus, RunSummary};
pub use page_state::PageState;
pub use target::Target;
