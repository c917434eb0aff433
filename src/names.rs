//! Reverse name index: entity → registered surface forms.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::term::{EntityKey, Term, TermStatus};

#[derive(Debug, Clone)]
struct NameEntry {
    text: String,
    status: TermStatus,
    source: String,
}

/// Read-only map from entity key to the names registered for it.
#[derive(Debug, Default)]
pub struct ReverseNameIndex {
    by_key: HashMap<EntityKey, Vec<NameEntry>>,
}

impl ReverseNameIndex {
    /// Builds the index from terms in registration order.
    pub fn build<'a>(terms: impl IntoIterator<Item = &'a Term>) -> Self {
        let mut by_key: HashMap<EntityKey, Vec<NameEntry>> = HashMap::new();
        for term in terms {
            by_key.entry(term.key()).or_default().push(NameEntry {
                text: term.text.clone(),
                status: term.status,
                source: term.source.clone(),
            });
        }
        Self { by_key }
    }

    /// Distinct surface forms of an entity, in registration order.
    ///
    /// `status` and `source` filter the terms considered. An unknown entity,
    /// or filters that leave nothing, yield an empty list.
    ///
    /// # Examples
    ///
    /// ```
    /// use grounder::{ReverseNameIndex, Term, TermStatus};
    ///
    /// let terms = vec![
    ///     Term::new("ESR1", "HGNC", "3467", "ESR1", TermStatus::Name, "hgnc"),
    ///     Term::new("ER", "HGNC", "3467", "ESR1", TermStatus::Synonym, "hgnc"),
    /// ];
    /// let names = ReverseNameIndex::build(&terms);
    /// assert_eq!(names.names_for("HGNC", "3467", None, None), ["ESR1", "ER"]);
    /// assert_eq!(names.names_for("HGNC", "3467", Some(TermStatus::Synonym), None), ["ER"]);
    /// ```
    #[must_use]
    pub fn names_for(
        &self,
        db: &str,
        id: &str,
        status: Option<TermStatus>,
        source: Option<&str>,
    ) -> Vec<String> {
        let Some(entries) = self.by_key.get(&EntityKey::new(db, id)) else {
            return Vec::new();
        };

        let mut seen: HashSet<&str> = HashSet::new();
        entries
            .iter()
            .filter(|e| status.map_or(true, |s| e.status == s))
            .filter(|e| source.map_or(true, |s| e.source == s))
            .filter(|e| seen.insert(e.text.as_str()))
            .map(|e| e.text.clone())
            .collect()
    }

    /// Returns true if any name is registered for the entity.
    #[must_use]
    pub fn contains(&self, key: &EntityKey) -> bool {
        self.by_key.contains_key(key)
    }

    /// Every entity with at least one name.
    #[must_use]
    pub fn entity_keys(&self) -> BTreeSet<EntityKey> {
        self.by_key.keys().cloned().collect()
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Returns true if no entity is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
