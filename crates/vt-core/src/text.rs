//! Title normalization and search relevance tiers.
//!
//! Titles and queries go through the same [`normalize_title`] before any
//! comparison. The database layer registers these functions as SQL scalars so
//! that filtering, scoring and ordering all run on identical normalization.

use crate::error::{Error, Result};

/// Characters folded to a single space during normalization.
const FOLDED_PUNCTUATION: [char; 9] = ['.', ',', '-', '\'', '\u{2018}', '\u{2019}', ':', '–', '—'];

/// Exact normalized match.
pub const SCORE_EXACT: i64 = 100;
/// Normalized title starts with the normalized query.
pub const SCORE_PREFIX: i64 = 90;
/// Normalized title ends with the normalized query.
pub const SCORE_SUFFIX: i64 = 80;
/// Lowercased raw title starts with the lowercased raw query.
pub const SCORE_RAW_PREFIX: i64 = 70;
/// Plain substring match.
pub const SCORE_SUBSTRING: i64 = 50;

/// Lowercase, fold punctuation to spaces, collapse whitespace runs, trim.
///
/// ```
/// assert_eq!(vt_core::text::normalize_title("Spider-Man: No Way Home"), "spider man no way home");
/// ```
pub fn normalize_title(input: &str) -> String {
    let folded: String = input
        .to_lowercase()
        .chars()
        .map(|c| if FOLDED_PUNCTUATION.contains(&c) { ' ' } else { c })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A validated free-text search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    raw: String,
    normalized: String,
}

impl SearchTerm {
    /// Build a term from user input. Input that is empty after trimming, or
    /// that normalizes to nothing, is rejected.
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(Error::validation("Search term must not be empty"));
        }
        let normalized = normalize_title(raw);
        if normalized.is_empty() {
            return Err(Error::validation("Search term must contain letters or digits"));
        }
        Ok(Self {
            raw: raw.to_string(),
            normalized,
        })
    }

    /// Trimmed input as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Relevance of `title` for this term, `None` when it does not match.
    pub fn relevance(&self, title: &str) -> Option<i64> {
        relevance(title, &self.normalized, &self.raw)
    }
}

/// Relevance tier of `title` against an already-normalized query.
///
/// Returns `None` when the normalized query is not a substring of the
/// normalized title; such rows never appear in search results.
pub fn relevance(title: &str, normalized_query: &str, raw_query: &str) -> Option<i64> {
    let normalized_title = normalize_title(title);
    if !normalized_title.contains(normalized_query) {
        return None;
    }

    let score = if normalized_title == normalized_query {
        SCORE_EXACT
    } else if normalized_title.starts_with(normalized_query) {
        SCORE_PREFIX
    } else if normalized_title.ends_with(normalized_query) {
        SCORE_SUFFIX
    } else if title
        .to_lowercase()
        .starts_with(&raw_query.trim().to_lowercase())
    {
        SCORE_RAW_PREFIX
    } else {
        SCORE_SUBSTRING
    };
    Some(score)
}
