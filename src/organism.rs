//! Organism priority ordering.
//!
//! Species-specific gene and protein terms are ordered by a caller-supplied
//! preference list of taxonomy identifiers. The list only breaks ties between
//! equal final scores; it never lifts a lower-scored match over a higher one.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::matches::ScoredMatch;

/// Taxonomy identifiers offered as species choices by front ends.
pub const POPULAR_ORGANISMS: &[(&str, &str)] = &[
    ("9606", "Homo sapiens"),
    ("10090", "Mus musculus"),
    ("10116", "Rattus norvegicus"),
    ("9913", "Bos taurus"),
    ("9031", "Gallus gallus"),
    ("9823", "Sus scrofa"),
    ("9544", "Macaca mulatta"),
    ("9598", "Pan troglodytes"),
    ("7227", "Drosophila melanogaster"),
    ("7955", "Danio rerio"),
    ("6239", "Caenorhabditis elegans"),
    ("559292", "Saccharomyces cerevisiae"),
    ("3702", "Arabidopsis thaliana"),
    ("83333", "Escherichia coli K-12"),
];

/// An order-preserving, deduplicated list of taxonomy identifiers.
///
/// - Duplicates are ignored (first occurrence wins).
/// - Blank entries are dropped.
/// - An empty list means "no preference".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct OrganismPriorityList(Vec<String>);

impl OrganismPriorityList {
    /// Builds a priority list.
    #[must_use]
    pub fn new<I, S>(organisms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut deduped: Vec<String> = Vec::new();
        for organism in organisms {
            let organism = organism.into().trim().to_string();
            if !organism.is_empty() && seen.insert(organism.clone()) {
                deduped.push(organism);
            }
        }
        Self(deduped)
    }

    /// Rank of an organism: its position in the list, or `usize::MAX` when
    /// absent or when the term is not organism-specific.
    #[must_use]
    pub fn rank(&self, organism: Option<&str>) -> usize {
        organism
            .and_then(|o| self.0.iter().position(|p| p == o))
            .unwrap_or(usize::MAX)
    }

    /// Returns true if no preference was given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The identifiers in priority order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for OrganismPriorityList {
    fn from(organisms: Vec<String>) -> Self {
        Self::new(organisms)
    }
}

impl From<OrganismPriorityList> for Vec<String> {
    fn from(list: OrganismPriorityList) -> Self {
        list.0
    }
}

/// Total order over matches: score descending, then organism rank, then
/// `(db, id)` ascending.
#[must_use]
pub fn compare(a: &ScoredMatch, b: &ScoredMatch, organisms: &OrganismPriorityList) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| {
            organisms
                .rank(a.term.organism.as_deref())
                .cmp(&organisms.rank(b.term.organism.as_deref()))
        })
        .then_with(|| a.term.db.cmp(&b.term.db))
        .then_with(|| a.term.id.cmp(&b.term.id))
        .then_with(|| a.term.text.cmp(&b.term.text))
}

/// Orders matches by score with organism preference breaking ties.
///
/// Matches without an organism, or with an organism not in the list, keep
/// plain score order among themselves.
#[must_use]
pub fn reorder(mut matches: Vec<ScoredMatch>, organisms: &OrganismPriorityList) -> Vec<ScoredMatch> {
    matches.sort_by(|a, b| compare(a, b, organisms));
    matches
}
