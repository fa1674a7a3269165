//! Fuzzy question matching
//!
//! Scores free-text input against every stored question and returns the
//! single best match above a similarity threshold. The metric is a
//! Ratcliff/Obershelp sequence ratio, pluggable through the
//! [`SimilarityMetric`] trait.

use std::collections::HashMap;

use crate::knowledge::KnowledgeBase;

/// Minimum similarity score for a query to be considered matched
pub const MATCH_THRESHOLD: f64 = 0.6;

/// Normalized [0, 1] similarity between two strings
pub trait SimilarityMetric {
    /// Similarity score; 1.0 for identical inputs, deterministic
    fn score(&self, a: &str, b: &str) -> f64;

    /// Cheap upper bound on `score`, used to skip full scoring.
    /// Must never be lower than `score` for the same inputs.
    fn upper_bound(&self, _a: &str, _b: &str) -> f64 {
        1.0
    }
}

/// Ratcliff/Obershelp sequence similarity.
///
/// Twice the number of matching characters over the combined length, where
/// matches are found by locating the longest common contiguous block and
/// recursing into the unmatched pieces on either side. Two empty strings
/// score 1.0; one empty string scores 0.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceRatio;

impl SimilarityMetric for SequenceRatio {
    fn score(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let total = a.len() + b.len();
        if total == 0 {
            return 1.0;
        }
        2.0 * matched_chars(&a, &b) as f64 / total as f64
    }

    /// Character-multiset overlap: an upper bound because matched blocks can
    /// never use a character more often than it occurs in either string
    fn upper_bound(&self, a: &str, b: &str) -> f64 {
        let a_len = a.chars().count();
        let b_len = b.chars().count();
        let total = a_len + b_len;
        if total == 0 {
            return 1.0;
        }

        let mut counts: HashMap<char, usize> = HashMap::with_capacity(b_len);
        for c in b.chars() {
            *counts.entry(c).or_insert(0) += 1;
        }

        let mut common = 0usize;
        for c in a.chars() {
            if let Some(count) = counts.get_mut(&c) {
                if *count > 0 {
                    *count -= 1;
                    common += 1;
                }
            }
        }

        2.0 * common as f64 / total as f64
    }
}

/// Total characters matched across all common blocks
fn matched_chars(a: &[char], b: &[char]) -> usize {
    let (a_start, b_start, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matched_chars(&a[..a_start], &b[..b_start])
        + matched_chars(&a[a_start + len..], &b[b_start + len..])
}

/// Longest common contiguous block, earliest occurrence on ties
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    if a.is_empty() || b.is_empty() {
        return best;
    }

    // run lengths of common suffixes ending at (i, j), row by row
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            if cur[j + 1] > best.2 {
                best = (i + 1 - cur[j + 1], j + 1 - cur[j + 1], cur[j + 1]);
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    best
}

/// Fuzzy matcher over the stored questions
#[derive(Debug, Clone)]
pub struct Matcher<M = SequenceRatio> {
    metric: M,
    threshold: f64,
}

impl Matcher<SequenceRatio> {
    /// Matcher with the default metric and threshold
    pub fn new() -> Self {
        Self {
            metric: SequenceRatio,
            threshold: MATCH_THRESHOLD,
        }
    }
}

impl Default for Matcher<SequenceRatio> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: SimilarityMetric> Matcher<M> {
    /// Use a custom similarity metric
    pub fn with_metric(metric: M, threshold: f64) -> Self {
        Self { metric, threshold }
    }

    /// Override the similarity threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// The highest-scoring stored question with score at or above the
    /// threshold, or `None` if nothing qualifies or the store is empty.
    /// Ties keep the earliest entry in store order.
    pub fn find_best_match<'a>(&self, base: &'a KnowledgeBase, query: &str) -> Option<&'a str> {
        let mut best: Option<(&'a str, f64)> = None;

        for entry in base.entries() {
            let question = entry.question.as_str();

            // a candidate must beat the current best, not just tie it
            let bound = self.metric.upper_bound(query, question);
            let cannot_win = match best {
                Some((_, score)) => bound <= score,
                None => bound < self.threshold,
            };
            if cannot_win {
                continue;
            }

            let score = self.metric.score(query, question);
            if score < self.threshold {
                continue;
            }
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((question, score));
            }
        }

        best.map(|(question, _)| question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_with(questions: &[&str]) -> KnowledgeBase {
        let mut base = KnowledgeBase::new("unused.json");
        for (i, q) in questions.iter().enumerate() {
            base.append(*q, format!("answer {i}"));
        }
        base
    }

    #[test]
    fn test_identical_strings_score_one() {
        let metric = SequenceRatio;
        assert_eq!(metric.score("hi there", "hi there"), 1.0);
    }

    #[test]
    fn test_empty_strings() {
        let metric = SequenceRatio;
        assert_eq!(metric.score("", ""), 1.0);
        assert_eq!(metric.score("abc", ""), 0.0);
        assert_eq!(metric.score("", "abc"), 0.0);
    }

    #[test]
    fn test_one_character_edit() {
        // "hi there" vs "hi their": blocks "hi the" + "r", 14/16
        let metric = SequenceRatio;
        let score = metric.score("hi their", "hi there");
        assert!((score - 0.875).abs() < 1e-9);
    }

    #[test]
    fn test_score_is_symmetric_on_shared_blocks() {
        let metric = SequenceRatio;
        let forward = metric.score("apple pie", "apple tart");
        let backward = metric.score("apple tart", "apple pie");
        assert!((forward - backward).abs() < 1e-9);
    }

    #[test]
    fn test_upper_bound_never_below_score() {
        let metric = SequenceRatio;
        for (a, b) in [
            ("hi there", "hi their"),
            ("completely unrelated text", "hi there"),
            ("abcxx", "abcyy"),
            ("", "abc"),
        ] {
            assert!(metric.upper_bound(a, b) >= metric.score(a, b) - 1e-12);
        }
    }

    #[test]
    fn test_exact_query_matches() {
        let base = base_with(&["hi there", "what time is it"]);
        let matcher = Matcher::new();
        assert_eq!(matcher.find_best_match(&base, "hi there"), Some("hi there"));
    }

    #[test]
    fn test_close_query_matches() {
        let base = base_with(&["hi there"]);
        let matcher = Matcher::new();
        assert_eq!(matcher.find_best_match(&base, "hi their"), Some("hi there"));
    }

    #[test]
    fn test_unrelated_query_does_not_match() {
        let base = base_with(&["hi there"]);
        let matcher = Matcher::new();
        assert_eq!(
            matcher.find_best_match(&base, "completely unrelated text"),
            None
        );
    }

    #[test]
    fn test_empty_store_never_matches() {
        let base = base_with(&[]);
        let matcher = Matcher::new();
        assert_eq!(matcher.find_best_match(&base, "anything"), None);
    }

    #[test]
    fn test_score_exactly_at_threshold_matches() {
        // "abcxx" vs "abcyy": matched block "abc", 6/10 = 0.6
        let metric = SequenceRatio;
        assert!((metric.score("abcxx", "abcyy") - 0.6).abs() < 1e-9);

        let base = base_with(&["abcyy"]);
        let matcher = Matcher::new();
        assert_eq!(matcher.find_best_match(&base, "abcxx"), Some("abcyy"));
    }

    #[test]
    fn test_tie_keeps_first_entry_in_store_order() {
        // both score 0.8 against "ab"
        let base = base_with(&["abc", "abd"]);
        let matcher = Matcher::new();
        assert_eq!(matcher.find_best_match(&base, "ab"), Some("abc"));
    }

    #[test]
    fn test_best_of_several_candidates_wins() {
        let base = base_with(&["how old are you", "hi there", "what is your name"]);
        let matcher = Matcher::new();
        assert_eq!(
            matcher.find_best_match(&base, "what is you name"),
            Some("what is your name")
        );
    }

    #[test]
    fn test_custom_metric_is_pluggable() {
        struct ExactOnly;
        impl SimilarityMetric for ExactOnly {
            fn score(&self, a: &str, b: &str) -> f64 {
                if a == b {
                    1.0
                } else {
                    0.0
                }
            }
        }

        let base = base_with(&["hi there"]);
        let matcher = Matcher::with_metric(ExactOnly, MATCH_THRESHOLD);
        assert_eq!(matcher.find_best_match(&base, "hi there"), Some("hi there"));
        assert_eq!(matcher.find_best_match(&base, "hi their"), None);
    }

    #[test]
    fn test_raised_threshold_rejects_near_misses() {
        let base = base_with(&["hi there"]);
        let matcher = Matcher::new().with_threshold(0.95);
        assert_eq!(matcher.find_best_match(&base, "hi their"), None);
        assert_eq!(matcher.find_best_match(&base, "hi there"), Some("hi there"));
    }

    #[test]
    fn test_multibyte_input_scores_per_character() {
        let metric = SequenceRatio;
        // 4 of 5 characters match in each string
        let score = metric.score("héllo", "hallo");
        assert!(score > 0.0 && score < 1.0);
        assert_eq!(metric.score("héllo", "héllo"), 1.0);
    }
}
