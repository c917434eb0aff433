//! Scored matches, the response type of grounding.
//!
//! Each match carries the term it grounds to, its final score, the URL of
//! the grounded entity, and a breakdown of how the score was produced.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::disambiguation::{blend, Prediction};
use crate::index::LookupKind;
use crate::scorer::{LexicalScore, MatchKind};
use crate::term::{EntityKey, Term};

/// Which scoring path produced a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPath {
    /// Lexical score only.
    Lexical,
    /// Lexical score blended with a model probability.
    Disambiguated,
}

/// Model output that was blended into a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisambiguationInfo {
    /// Normalized text of the model that was applied.
    pub model: String,
    /// Probability the model assigned to this match's entity.
    pub probability: f32,
    /// Probability mass the model assigned to the ungrounded sense.
    pub ungrounded: f32,
    /// Share of the lexical score kept at zero probability.
    pub floor: f32,
}

/// Explainability record for a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchMetadata {
    /// The mention as given.
    pub query: String,
    /// The term text it was compared with.
    pub reference: String,
    /// Whether a model contributed to the score.
    pub path: ScoringPath,
    /// Index route that produced the candidate.
    pub lookup: LookupKind,
    /// How closely the mention matched the term text.
    pub kind: MatchKind,
    /// String quality component.
    pub string_score: f32,
    /// Term status component.
    pub status_score: f32,
    /// Combined score before disambiguation.
    pub lexical_score: f32,
    /// Model output, when one was applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disambiguation: Option<DisambiguationInfo>,
}

impl MatchMetadata {
    /// Metadata for a lexical-only score.
    #[must_use]
    pub fn lexical(query: impl Into<String>, lexical: LexicalScore, lookup: LookupKind) -> Self {
        Self {
            query: query.into(),
            reference: String::new(),
            path: ScoringPath::Lexical,
            lookup,
            kind: lexical.kind,
            string_score: lexical.string_score,
            status_score: lexical.status_score,
            lexical_score: lexical.score,
            disambiguation: None,
        }
    }
}

/// A candidate term with its final score.
///
/// # Examples
///
/// ```
/// use grounder::{MatchMetadata, ScoredMatch, Term, TermStatus};
/// use grounder::index::LookupKind;
/// use grounder::scorer;
///
/// let term = Term::new("EGFR", "HGNC", "3236", "EGFR", TermStatus::Name, "hgnc");
/// let lexical = scorer::score("EGFR", &term);
/// let m = ScoredMatch::new(term, MatchMetadata::lexical("EGFR", lexical, LookupKind::Exact));
/// assert_eq!(m.url(), "https://identifiers.org/hgnc:3236");
/// assert_eq!(m.score, lexical.score);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    /// The matched term.
    pub term: Term,
    url: String,
    /// Final score in [0, 1].
    pub score: f32,
    #[serde(rename = "match")]
    pub metadata: MatchMetadata,

    /// Other terms of the same entity folded into this match.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subsumed_terms: Vec<Term>,
}

impl ScoredMatch {
    /// Creates a match scored by its lexical score.
    #[must_use]
    pub fn new(term: Term, mut metadata: MatchMetadata) -> Self {
        metadata.reference.clone_from(&term.text);
        Self {
            url: term.url(),
            score: metadata.lexical_score,
            term,
            metadata,
            subsumed_terms: Vec::new(),
        }
    }

    /// URL of the grounded entity, derived from `(db, id)`.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Entity key of the grounded term.
    #[must_use]
    pub fn key(&self) -> EntityKey {
        self.term.key()
    }

    /// Returns true if a model probability was blended in.
    #[must_use]
    pub fn is_disambiguated(&self) -> bool {
        self.metadata.path == ScoringPath::Disambiguated
    }

    /// Re-scores this match with a model prediction.
    pub fn apply_prediction(&mut self, model: &str, prediction: &Prediction, floor: f32) {
        let probability = prediction.probability(&self.key());
        self.score = blend(self.metadata.lexical_score, probability, floor);
        self.metadata.path = ScoringPath::Disambiguated;
        self.metadata.disambiguation = Some(DisambiguationInfo {
            model: model.to_string(),
            probability,
            ungrounded: prediction.ungrounded,
            floor,
        });
    }
}

/// Collapses matches to one per entity.
///
/// The best match of each entity (highest score, then strongest status, then
/// text) is kept; the other terms are recorded in its `subsumed_terms`.
/// Output order follows the first appearance of each entity in the input.
#[must_use]
pub fn merge_equivalent(matches: Vec<ScoredMatch>) -> Vec<ScoredMatch> {
    let mut order: Vec<EntityKey> = Vec::new();
    let mut groups: BTreeMap<EntityKey, Vec<ScoredMatch>> = BTreeMap::new();
    for m in matches {
        let key = m.key();
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(m);
    }

    order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .filter_map(|mut group| {
            group.sort_by(|a, b| {
                b.score
                    .total_cmp(&a.score)
                    .then_with(|| a.term.status.cmp(&b.term.status))
                    .then_with(|| a.term.text.cmp(&b.term.text))
            });
            let mut iter = group.into_iter();
            let mut best = iter.next()?;
            for other in iter {
                best.subsumed_terms.push(other.term);
                best.subsumed_terms.extend(other.subsumed_terms);
            }
            Some(best)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer;
    use crate::term::TermStatus;

    fn scored(raw: &str, term: Term) -> ScoredMatch {
        let lexical = scorer::score(raw, &term);
        ScoredMatch::new(term, MatchMetadata::lexical(raw, lexical, LookupKind::Exact))
    }

    fn prediction(entries: &[(EntityKey, f32)], ungrounded: f32) -> Prediction {
        Prediction {
            probabilities: entries.iter().cloned().collect(),
            ungrounded,
        }
    }

    #[test]
    fn test_new_uses_lexical_score() {
        let m = scored("ER", Term::new("ER", "GO", "GO:0005783", "endoplasmic reticulum", TermStatus::Synonym, "go"));
        assert_eq!(m.metadata.path, ScoringPath::Lexical);
        assert!((m.score - m.metadata.lexical_score).abs() < f32::EPSILON);
        assert_eq!(m.metadata.reference, "ER");
        assert_eq!(m.url(), "https://identifiers.org/GO:0005783");
    }

    #[test]
    fn test_apply_prediction() {
        let mut m = scored("ER", Term::new("ER", "GO", "GO:0005783", "endoplasmic reticulum", TermStatus::Synonym, "go"));
        let lexical = m.score;
        m.apply_prediction("er", &prediction(&[(m.key(), 0.8)], 0.0), 0.1);
        assert!(m.is_disambiguated());
        assert!((m.score - lexical * (0.1 + 0.9 * 0.8)).abs() < 1e-6);
        let info = m.metadata.disambiguation.as_ref().unwrap();
        assert_eq!(info.model, "er");
        assert!((info.probability - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_apply_prediction_unknown_entity() {
        let mut m = scored("ER", Term::new("ER", "MESH", "D004721", "Emergency", TermStatus::Synonym, "mesh"));
        let lexical = m.score;
        m.apply_prediction("er", &prediction(&[], 0.5), 0.1);
        assert!((m.score - lexical * 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_json_shape() {
        let m = scored("EGFR", Term::new("EGFR", "HGNC", "3236", "EGFR", TermStatus::Name, "hgnc"));
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["term"]["db"], "HGNC");
        assert_eq!(json["url"], "https://identifiers.org/hgnc:3236");
        assert_eq!(json["match"]["path"], "lexical");
        assert_eq!(json["match"]["kind"], "exact");
        assert!(json["match"].get("disambiguation").is_none());
        assert!(json.get("subsumed_terms").is_none());
        assert!(json["score"].as_f64().unwrap() > 0.9);
    }

    #[test]
    fn test_merge_equivalent() {
        let matches = vec![
            scored("EGFR", Term::new("EGFR", "HGNC", "3236", "EGFR", TermStatus::Previous, "hgnc")),
            scored("EGFR", Term::new("EGFR", "MESH", "D066246", "ErbB Receptors", TermStatus::Synonym, "mesh")),
            scored("EGFR", Term::new("EGFR", "HGNC", "3236", "EGFR", TermStatus::Name, "hgnc")),
        ];
        let merged = merge_equivalent(matches);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].term.db, "HGNC");
        assert_eq!(merged[0].term.status, TermStatus::Name);
        assert_eq!(merged[0].subsumed_terms.len(), 1);
        assert_eq!(merged[0].subsumed_terms[0].status, TermStatus::Previous);
        assert_eq!(merged[1].term.db, "MESH");
        assert!(merged[1].subsumed_terms.is_empty());
    }
}
