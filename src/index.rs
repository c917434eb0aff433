//! Term index: normalized text → candidate terms.
//!
//! The index is built once from the full term list and never mutated
//! afterwards. Exact lookup is a single hash probe on the normalized key.
//! Approximate lookup re-applies the ingest normalization and probes a small,
//! fixed set of variants (dash/space-insensitive key, singular forms).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::normalize::{depluralize, squash};
use crate::term::{EntityKey, Term};

/// How a candidate was reached from the mention.
///
/// Variants are ordered from most to least precise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    /// The normalized mention equals the term's `norm_text`.
    Exact,
    /// Equal after dropping every non-alphanumeric character.
    Squashed,
    /// A singular form of the mention equals the term's `norm_text`.
    Depluralized,
}

/// A term found for a mention, with the route that found it.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// The candidate term.
    pub term: &'a Term,
    /// How it was found.
    pub lookup: LookupKind,
}

/// Read-only lookup structure over all registered terms.
#[derive(Debug, Default)]
pub struct TermIndex {
    terms: Vec<Term>,
    by_norm: HashMap<String, Vec<usize>>,
    by_squashed: HashMap<String, Vec<usize>>,
}

impl TermIndex {
    /// Builds the index, validating every term.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` raised by [`Term::validate`].
    pub fn build(terms: Vec<Term>) -> Result<Self, ValidationError> {
        let mut by_norm: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_squashed: HashMap<String, Vec<usize>> = HashMap::new();

        for (idx, term) in terms.iter().enumerate() {
            term.validate()?;
            by_norm.entry(term.norm_text.clone()).or_default().push(idx);

            let squashed = squash(&term.norm_text);
            if !squashed.is_empty() {
                by_squashed.entry(squashed).or_default().push(idx);
            }
        }

        Ok(Self {
            terms,
            by_norm,
            by_squashed,
        })
    }

    /// Exact-normalized lookup. Unknown keys yield an empty list.
    #[must_use]
    pub fn lookup(&self, norm_text: &str) -> Vec<&Term> {
        self.by_norm
            .get(norm_text)
            .map(|ids| ids.iter().map(|&i| &self.terms[i]).collect())
            .unwrap_or_default()
    }

    /// Returns true if any term is registered under `norm_text`.
    #[must_use]
    pub fn contains(&self, norm_text: &str) -> bool {
        self.by_norm.contains_key(norm_text)
    }

    /// Collects candidates for an already-normalized mention.
    ///
    /// With `approximate` off this is exactly [`TermIndex::lookup`]. With it
    /// on, squashed and singular variants are probed too; a term reached by
    /// several routes is reported once with its most precise route. Output
    /// order follows registration order.
    #[must_use]
    pub fn candidates(&self, norm_text: &str, approximate: bool) -> Vec<Candidate<'_>> {
        let mut found: BTreeMap<usize, LookupKind> = BTreeMap::new();
        let mut record = |ids: Option<&Vec<usize>>, kind: LookupKind| {
            for &idx in ids.into_iter().flatten() {
                found
                    .entry(idx)
                    .and_modify(|k| *k = (*k).min(kind))
                    .or_insert(kind);
            }
        };

        record(self.by_norm.get(norm_text), LookupKind::Exact);

        if approximate {
            let squashed = squash(norm_text);
            if !squashed.is_empty() {
                record(self.by_squashed.get(&squashed), LookupKind::Squashed);
            }
            for singular in depluralize(norm_text) {
                record(self.by_norm.get(&singular), LookupKind::Depluralized);
            }
        }

        found
            .into_iter()
            .map(|(idx, lookup)| Candidate {
                term: &self.terms[idx],
                lookup,
            })
            .collect()
    }

    /// All registered terms, in registration order.
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.terms.iter()
    }

    /// Every distinct entity with at least one term.
    #[must_use]
    pub fn entity_keys(&self) -> BTreeSet<EntityKey> {
        self.terms.iter().map(Term::key).collect()
    }

    /// Number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns true if the index holds no terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of distinct normalized keys.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.by_norm.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::TermStatus;

    fn index() -> TermIndex {
        TermIndex::build(vec![
            Term::new("IL-6", "HGNC", "6018", "IL6", TermStatus::Name, "hgnc"),
            Term::new("IL6", "UP", "P05231", "IL6", TermStatus::Name, "uniprot"),
            Term::new("kinase", "GO", "GO:0016301", "kinase activity", TermStatus::Synonym, "go"),
            Term::new("Interleukin 6", "HGNC", "6018", "IL6", TermStatus::Synonym, "hgnc"),
        ])
        .unwrap()
    }

    #[test]
    fn test_exact_lookup() {
        let index = index();
        let found = index.lookup("il-6");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].db, "HGNC");
        assert!(index.contains("interleukin 6"));
    }

    #[test]
    fn test_unknown_key_is_empty() {
        let index = index();
        assert!(index.lookup("nothing").is_empty());
        assert!(index.candidates("nothing", true).is_empty());
    }

    #[test]
    fn test_exact_only_candidates() {
        let index = index();
        let found = index.candidates("il-6", false);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].lookup, LookupKind::Exact);
    }

    #[test]
    fn test_squashed_candidates() {
        let index = index();
        let found = index.candidates("il-6", true);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].term.db, "HGNC");
        assert_eq!(found[0].lookup, LookupKind::Exact);
        assert_eq!(found[1].term.db, "UP");
        assert_eq!(found[1].lookup, LookupKind::Squashed);
    }

    #[test]
    fn test_depluralized_candidates() {
        let index = index();
        let found = index.candidates("kinases", true);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].term.id, "GO:0016301");
        assert_eq!(found[0].lookup, LookupKind::Depluralized);
    }

    #[test]
    fn test_entity_keys() {
        let index = index();
        let keys = index.entity_keys();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&EntityKey::new("HGNC", "6018")));
        assert_eq!(index.len(), 4);
        assert_eq!(index.key_count(), 4);
    }

    #[test]
    fn test_build_rejects_invalid_term() {
        let err = TermIndex::build(vec![Term::new("x", "HGNC", "", "x", TermStatus::Name, "hgnc")])
            .unwrap_err();
        assert!(matches!(err, ValidationError::EmptyField { .. }));
    }
}
