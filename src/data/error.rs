use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while resolving the dataset.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The remote source could not be fetched or parsed. Recoverable.
    #[error("could not load dataset from {url}: {reason}")]
    RemoteFetchFailed { url: String, reason: String },

    /// A local candidate exists but could not be parsed. Recoverable.
    #[error("{}: {reason}", .path.display())]
    LocalPathUnreadable { path: PathBuf, reason: String },

    /// No source yielded a usable table. Fatal for the session.
    #[error("{0}")]
    DataUnavailable(Diagnostic),
}

/// One source the loader tried, and why it did not produce a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub location: String,
    /// `None` when the source was simply absent.
    pub error: Option<String>,
}

/// Everything needed to explain a failed load to the user.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub file_name: String,
    pub attempts: Vec<Attempt>,
    pub cwd: PathBuf,
    pub app_dir: PathBuf,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "could not find '{}' in any of these locations:",
            self.file_name
        )?;
        for attempt in &self.attempts {
            match &attempt.error {
                Some(err) => writeln!(f, "- {} (error: {err})", attempt.location)?,
                None => writeln!(f, "- {}", attempt.location)?,
            }
        }
        writeln!(f)?;
        writeln!(f, "cwd={}", self.cwd.display())?;
        write!(f, "app_dir={}", self.app_dir.display())
    }
}
