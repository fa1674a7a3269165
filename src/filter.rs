//! Answer moderation
//!
//! Newly taught answers are screened against a blacklist of forbidden
//! terms before they enter the knowledge base. Absence of the blacklist
//! file is a startup error; the filter is never skipped.

use std::path::Path;
use tracing::debug;

use crate::knowledge::StorageError;

/// Forbidden terms, lowercased at load, read-only for the session
#[derive(Debug, Clone)]
pub struct Blacklist {
    terms: Vec<String>,
}

impl Blacklist {
    /// Load terms from a newline-delimited file, one term per line.
    /// Blank lines are ignored.
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        if !path.exists() {
            return Err(StorageError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let blacklist = Self::from_terms(contents.lines());
        debug!(terms = blacklist.len(), path = %path.display(), "Loaded blacklist");
        Ok(blacklist)
    }

    /// Build a blacklist from terms already in memory
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|term| term.as_ref().trim().to_lowercase())
            .filter(|term| !term.is_empty())
            .collect();
        Self { terms }
    }

    /// True unless any blacklisted term occurs in `answer`, case-insensitively
    pub fn is_appropriate(&self, answer: &str) -> bool {
        let lowered = answer.to_lowercase();
        match self.terms.iter().find(|term| lowered.contains(term.as_str())) {
            Some(term) => {
                debug!(%term, "Rejected answer containing blacklisted term");
                false
            }
            None => true,
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
