//! Knowledge base persistence
//!
//! Question/answer pairs live in a single JSON document with a top-level
//! `questions` array. The whole file is read at startup and fully rewritten
//! on save; entries only ever change by append.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors from loading or persisting the knowledge base and blacklist
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing file does not exist
    #[error("{} not found (run `apprentice init` to create the starter files)", path.display())]
    NotFound { path: PathBuf },
    /// The backing file could not be read or written
    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The backing file is not a valid knowledge document
    #[error("{} is malformed: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

/// A single stored question/answer pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaEntry {
    pub question: String,
    pub answer: String,
}

/// On-disk document layout: one top-level `questions` array
#[derive(Debug, Default, Serialize, Deserialize)]
struct KnowledgeFile {
    questions: Vec<QaEntry>,
}

/// In-memory knowledge base bound to its backing file.
///
/// Insertion order is preserved; it decides which duplicate wins on exact
/// lookup and the entry order in the saved file.
#[derive(Debug)]
pub struct KnowledgeBase {
    path: PathBuf,
    entries: Vec<QaEntry>,
}

impl KnowledgeBase {
    /// Create an empty in-memory base bound to `path` (nothing written yet)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
        }
    }

    /// Load the knowledge base from `path`
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

        // serde reports a missing or mistyped `questions` key as a parse error
        let file: KnowledgeFile =
            serde_json::from_str(&contents).map_err(|e| StorageError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        debug!(entries = file.questions.len(), path = %path.display(), "Loaded knowledge base");

        Ok(Self {
            path: path.to_path_buf(),
            entries: file.questions,
        })
    }

    /// Create an empty knowledge base at `path`, writing the starter document
    pub fn create(path: &Path) -> Result<Self, StorageError> {
        let base = Self::new(path);
        base.save()?;
        Ok(base)
    }

    /// Rewrite the backing file with the current entries.
    ///
    /// Idempotent; called from both the normal exit path and the interrupt
    /// hook, and running it twice is harmless.
    pub fn save(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: self.path.clone(),
                source,
            })?;
        }

        let file = KnowledgeFile {
            questions: self.entries.clone(),
        };
        let contents =
            serde_json::to_string_pretty(&file).map_err(|e| StorageError::Malformed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        std::fs::write(&self.path, contents).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!(entries = self.entries.len(), path = %self.path.display(), "Saved knowledge base");
        Ok(())
    }

    /// Append a new pair; takes effect on disk at the next `save`
    pub fn append(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.entries.push(QaEntry {
            question: question.into(),
            answer: answer.into(),
        });
    }

    /// Answer of the first entry whose question matches exactly (case-sensitive)
    pub fn answer_for(&self, question: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.question == question)
            .map(|entry| entry.answer.as_str())
    }

    /// All stored pairs in insertion order
    pub fn entries(&self) -> &[QaEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}
