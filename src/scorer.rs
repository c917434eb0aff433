//! Lexical scoring of a mention against a candidate term.
//!
//! Scores are a pure function of `(raw_text, term)`: no state, no
//! configuration, identical across requests and processes. The final lexical
//! score is a weighted sum of string-match quality and term status:
//!
//! | match kind         | string score        |
//! |--------------------|---------------------|
//! | exact              | 1.0                 |
//! | case-insensitive   | 0.85 ..= 0.95       |
//! | normalized         | 0.8                 |
//! | squashed           | 0.7                 |
//! | fuzzy              | 0.0 ..= 0.6         |

use serde::{Deserialize, Serialize};

use crate::normalize::{normalize, squash};
use crate::term::{Term, TermStatus};

/// Weight of string-match quality in the lexical score.
pub const STRING_WEIGHT: f32 = 0.8;

/// Weight of term status in the lexical score.
pub const STATUS_WEIGHT: f32 = 0.2;

const CASE_INSENSITIVE_MAX: f32 = 0.95;
const CASE_MISMATCH_PENALTY: f32 = 0.1;
const NORMALIZED_SCORE: f32 = 0.8;
const SQUASHED_SCORE: f32 = 0.7;
const FUZZY_MAX: f32 = 0.6;

/// String-level relationship between mention and term text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Identical, including case.
    Exact,
    /// Identical up to letter case.
    CaseInsensitive,
    /// Identical after normalization (spacing, dashes, Greek letters, Unicode forms).
    Normalized,
    /// Identical after dropping non-alphanumeric characters.
    Squashed,
    /// Similar but not equal under any of the above.
    Fuzzy,
}

/// Breakdown of a lexical score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LexicalScore {
    /// How the strings relate.
    pub kind: MatchKind,
    /// String-match quality in [0, 1].
    pub string_score: f32,
    /// Status weight in [0, 1].
    pub status_score: f32,
    /// Combined lexical score in [0, 1].
    pub score: f32,
}

/// Status contribution: assertions and names outrank synonyms and previous names.
#[must_use]
pub const fn status_score(status: TermStatus) -> f32 {
    match status {
        TermStatus::Assertion => 1.0,
        TermStatus::Name => 0.9,
        TermStatus::Synonym => 0.7,
        TermStatus::Previous => 0.6,
    }
}

/// Scores a raw mention against a term.
///
/// # Examples
///
/// ```
/// use grounder::{Term, TermStatus};
/// use grounder::scorer::{score, MatchKind};
///
/// let term = Term::new("EGFR", "HGNC", "3236", "EGFR", TermStatus::Name, "hgnc");
/// let exact = score("EGFR", &term);
/// let lower = score("egfr", &term);
/// assert_eq!(exact.kind, MatchKind::Exact);
/// assert_eq!(lower.kind, MatchKind::CaseInsensitive);
/// assert!(exact.score > lower.score);
/// ```
#[must_use]
pub fn score(raw_text: &str, term: &Term) -> LexicalScore {
    score_with_norm(raw_text, &normalize(raw_text), term)
}

/// Same as [`score`] with the mention's normalized form precomputed.
#[must_use]
pub fn score_with_norm(raw_text: &str, norm_text: &str, term: &Term) -> LexicalScore {
    let (kind, string_score) = string_match(raw_text.trim(), norm_text, term);
    let status_score = status_score(term.status);
    let score = (STRING_WEIGHT * string_score + STATUS_WEIGHT * status_score).clamp(0.0, 1.0);
    LexicalScore {
        kind,
        string_score,
        status_score,
        score,
    }
}

fn string_match(raw: &str, norm: &str, term: &Term) -> (MatchKind, f32) {
    if raw == term.text {
        return (MatchKind::Exact, 1.0);
    }
    if raw.to_lowercase() == term.text.to_lowercase() {
        let ratio = case_mismatch_ratio(raw, &term.text);
        return (
            MatchKind::CaseInsensitive,
            CASE_INSENSITIVE_MAX - CASE_MISMATCH_PENALTY * ratio,
        );
    }
    if norm == term.norm_text {
        return (MatchKind::Normalized, NORMALIZED_SCORE);
    }
    let squashed = squash(norm);
    if !squashed.is_empty() && squashed == squash(&term.norm_text) {
        return (MatchKind::Squashed, SQUASHED_SCORE);
    }

    #[allow(clippy::cast_possible_truncation)]
    let similarity = strsim::normalized_levenshtein(norm, &term.norm_text) as f32;
    (MatchKind::Fuzzy, FUZZY_MAX * similarity.clamp(0.0, 1.0))
}

/// Fraction of cased characters whose case differs.
fn case_mismatch_ratio(a: &str, b: &str) -> f32 {
    if a.chars().count() != b.chars().count() {
        return 1.0;
    }
    let mut cased = 0u32;
    let mut mismatched = 0u32;
    for (x, y) in a.chars().zip(b.chars()) {
        if x.is_alphabetic() {
            cased += 1;
            if x != y {
                mismatched += 1;
            }
        }
    }
    if cased == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = mismatched as f32 / cased as f32;
    ratio
}
