pub mod fs;
pub mod writer;

use std::path::PathBuf;

use crate::app::Result;

pub use fs::FsStore;
pub use writer::{format_document, DocumentWriter};

pub trait DocumentStore {
    /// Persist a document under `id`, returning where it was written
    fn persist(&self, id: &str, contents: &str) -> Result<PathBuf>;

    /// Where an auxiliary artifact named `name` would be written
    fn artifact_path(&self, name: &str) -> PathBuf;
}
