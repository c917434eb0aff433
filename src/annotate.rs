//! Annotation of running text.
//!
//! Scans a sentence left to right and grounds the longest word n-gram
//! starting at each position, skipping n-grams that start with a stop word.
//! Annotated spans never overlap; the whole text serves as context for
//! disambiguation.

use serde::{Deserialize, Serialize};

use crate::grounder::{GroundQuery, Grounder};
use crate::matches::ScoredMatch;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "in", "into",
    "is", "it", "its", "of", "on", "or", "that", "the", "this", "to", "was", "were", "which",
    "with",
];

/// A grounded span of the input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// The span as it appears in the input.
    pub text: String,
    /// Byte offset of the span start.
    pub start: usize,
    /// Byte offset one past the span end.
    pub end: usize,
    /// Matches for the span, best first.
    pub matches: Vec<ScoredMatch>,
}

/// Whitespace-separated words with surrounding punctuation stripped, as
/// byte ranges into `text`.
fn words(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut offset = 0;
    for raw in text.split_whitespace() {
        let Some(rel) = text[offset..].find(raw) else {
            continue;
        };
        let raw_start = offset + rel;
        offset = raw_start + raw.len();

        let trimmed = raw.trim_matches(|c: char| !c.is_alphanumeric());
        if trimmed.is_empty() {
            continue;
        }
        let lead = raw.len() - raw.trim_start_matches(|c: char| !c.is_alphanumeric()).len();
        let start = raw_start + lead;
        spans.push((start, start + trimmed.len()));
    }
    spans
}

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.iter().any(|s| s.eq_ignore_ascii_case(word))
}

impl Grounder {
    /// Finds and grounds entity mentions in a sentence.
    ///
    /// # Examples
    ///
    /// ```
    /// use grounder::{GrounderBuilder, Term, TermStatus};
    ///
    /// let grounder = GrounderBuilder::new()
    ///     .term(Term::new("MEK", "FPLX", "MEK", "MEK", TermStatus::Name, "famplex"))
    ///     .term(Term::new("ERK", "FPLX", "ERK", "ERK", TermStatus::Name, "famplex"))
    ///     .build()
    ///     .unwrap();
    ///
    /// let annotations = grounder.annotate("MEK phosphorylates ERK.", &[]);
    /// assert_eq!(annotations.len(), 2);
    /// assert_eq!(annotations[1].text, "ERK");
    /// assert_eq!((annotations[1].start, annotations[1].end), (19, 22));
    /// ```
    #[must_use]
    pub fn annotate(&self, text: &str, organisms: &[&str]) -> Vec<Annotation> {
        let words = words(text);
        let max_ngram = self.config().max_annotation_ngram;
        let mut annotations = Vec::new();

        let mut i = 0;
        while i < words.len() {
            let (start, first_end) = words[i];
            if is_stop_word(&text[start..first_end]) {
                i += 1;
                continue;
            }

            let longest = max_ngram.min(words.len() - i);
            let found = (1..=longest).rev().find_map(|n| {
                let end = words[i + n - 1].1;
                let span = &text[start..end];
                let query = GroundQuery::new(span)
                    .context(text)
                    .organisms(organisms.iter().copied());
                let matches = self.execute(&query);
                (!matches.is_empty()).then(|| (n, end, matches))
            });

            match found {
                Some((n, end, matches)) => {
                    annotations.push(Annotation {
                        text: text[start..end].to_string(),
                        start,
                        end,
                        matches,
                    });
                    i += n;
                }
                None => i += 1,
            }
        }
        annotations
    }
}
