//! Apprentice - Teachable Q&A Assistant Library
//!
//! A small assistant that:
//! - Answers free-text questions by fuzzy-matching them against stored pairs
//! - Learns new answers interactively when nothing matches
//! - Moderates taught answers against a blacklist of forbidden terms
//! - Persists its knowledge on normal exit and on interrupt
//!
//! # Example
//!
//! ```ignore
//! use apprentice::{KnowledgeBase, Matcher};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let base = KnowledgeBase::load(Path::new("knowledge.json"))?;
//!     let matcher = Matcher::new();
//!     if let Some(question) = matcher.find_best_match(&base, "hi their") {
//!         println!("{}", base.answer_for(question).unwrap_or_default());
//!     }
//!     Ok(())
//! }
//! ```

// Core modules (knowledge must come first since matcher and filter depend on it)
pub mod knowledge;
pub mod matcher;
pub mod filter;
pub mod config;
pub mod interactive;
pub mod cli;

// Re-export commonly used types for convenience
pub use knowledge::{KnowledgeBase, QaEntry, StorageError};

pub use matcher::{Matcher, SequenceRatio, SimilarityMetric, MATCH_THRESHOLD};

pub use filter::Blacklist;

pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get the library info
pub fn info() -> String {
    format!("{} v{} - Teachable Q&A Assistant Library", NAME, VERSION)
}
