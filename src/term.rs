//! Term types and entity identity.
//!
//! A [`Term`] is one registered surface form of one knowledge-base entity.
//! The entity itself is identified by its namespace and identifier, the
//! [`EntityKey`]. Many terms share a key (synonyms of one entity) and many
//! terms share a normalized text (ambiguity across entities).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::normalize::normalize;

/// Namespace + identifier uniquely identifying a grounded entity.
///
/// Ordering is lexicographic by `db`, then `id`, which is the final
/// tie-breaker when ranking matches.
///
/// # Examples
///
/// ```
/// use grounder::EntityKey;
///
/// let key = EntityKey::new("HGNC", "3236");
/// assert_eq!(key.to_string(), "HGNC:3236");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    /// Namespace, e.g. `HGNC`.
    pub db: String,
    /// Identifier within the namespace.
    pub id: String,
}

impl EntityKey {
    /// Creates a key from a namespace and identifier.
    #[must_use]
    pub fn new(db: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            db: db.into(),
            id: id.into(),
        }
    }

    /// Returns the compact `namespace:identifier` curie.
    ///
    /// Identifiers that already embed their namespace prefix
    /// (`GO:0005783`, `CHEBI:15377`) are returned as-is.
    #[must_use]
    pub fn curie(&self) -> String {
        let prefix = identifiers_prefix(&self.db);
        if embeds_prefix(&self.id, prefix) {
            self.id.clone()
        } else {
            format!("{prefix}:{}", self.id)
        }
    }

    /// Returns the resolvable identifiers.org URL for this entity.
    #[must_use]
    pub fn url(&self) -> String {
        format!("https://identifiers.org/{}", self.curie())
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.db, self.id)
    }
}

fn identifiers_prefix(db: &str) -> &str {
    match db {
        "UP" => "uniprot",
        "UPPRO" => "uniprot.chain",
        "UPISO" => "uniprot.isoform",
        "HGNC" => "hgnc",
        "FPLX" => "fplx",
        "MESH" => "mesh",
        "EFO" => "efo",
        "NCBI" | "EGID" => "ncbigene",
        "PUBCHEM" => "pubchem.compound",
        "IP" => "interpro",
        "PF" => "pfam",
        "DRUGBANK" => "drugbank",
        "CHEMBL" => "chembl.compound",
        "ADEFT" | "GILDA" => "ungrounded",
        other => other,
    }
}

fn embeds_prefix(id: &str, prefix: &str) -> bool {
    id.split_once(':')
        .is_some_and(|(head, _)| head.eq_ignore_ascii_case(prefix))
}

/// Relationship of a term's text to the entity it names.
///
/// Variants are declared from strongest to weakest evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermStatus {
    /// Manually asserted mapping of the text to the entity.
    Assertion,
    /// The entity's standard name or symbol.
    Name,
    /// An accepted synonym.
    Synonym,
    /// A former name or withdrawn symbol.
    Previous,
}

impl TermStatus {
    /// Every status, strongest first.
    pub const ALL: [Self; 4] = [Self::Assertion, Self::Name, Self::Synonym, Self::Previous];

    /// Returns the canonical lowercase label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Assertion => "assertion",
            Self::Name => "name",
            Self::Synonym => "synonym",
            Self::Previous => "previous",
        }
    }
}

impl fmt::Display for TermStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TermStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "assertion" | "curated" => Ok(Self::Assertion),
            "name" => Ok(Self::Name),
            "synonym" => Ok(Self::Synonym),
            "previous" | "former_name" => Ok(Self::Previous),
            _ => Err(ValidationError::InvalidStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// One registered surface form of an entity.
///
/// Terms are immutable once handed to the grounder.
///
/// # Examples
///
/// ```
/// use grounder::{Term, TermStatus};
///
/// let term = Term::new("EGFR", "HGNC", "3236", "EGFR", TermStatus::Name, "hgnc")
///     .with_organism("9606");
/// assert_eq!(term.norm_text, "egfr");
/// assert_eq!(term.url(), "https://identifiers.org/hgnc:3236");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    /// Normalized lookup key.
    pub norm_text: String,
    /// Surface form as registered.
    pub text: String,
    /// Namespace of the grounded entity.
    pub db: String,
    /// Identifier of the grounded entity.
    pub id: String,
    /// Standard name of the entity.
    pub entry_name: String,
    /// Relationship of `text` to the entity.
    pub status: TermStatus,
    /// Resource the term was collected from.
    pub source: String,

    /// Taxonomy identifier for species-specific genes and proteins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organism: Option<String>,

    /// Namespace the term was originally collected under, when mapped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_db: Option<String>,

    /// Identifier the term was originally collected under, when mapped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

impl Term {
    /// Creates a term, deriving `norm_text` from `text`.
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        db: impl Into<String>,
        id: impl Into<String>,
        entry_name: impl Into<String>,
        status: TermStatus,
        source: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self {
            norm_text: normalize(&text),
            text,
            db: db.into(),
            id: id.into(),
            entry_name: entry_name.into(),
            status,
            source: source.into(),
            organism: None,
            source_db: None,
            source_id: None,
        }
    }

    /// Marks the term as specific to a taxonomy identifier.
    #[must_use]
    pub fn with_organism(mut self, organism: impl Into<String>) -> Self {
        self.organism = Some(organism.into());
        self
    }

    /// Records the namespace and identifier the term was mapped from.
    #[must_use]
    pub fn with_source_grounding(
        mut self,
        source_db: impl Into<String>,
        source_id: impl Into<String>,
    ) -> Self {
        self.source_db = Some(source_db.into());
        self.source_id = Some(source_id.into());
        self
    }

    /// Returns the entity key `(db, id)`.
    #[must_use]
    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.db.clone(), self.id.clone())
    }

    /// Returns the identifiers.org URL of the grounded entity.
    #[must_use]
    pub fn url(&self) -> String {
        self.key().url()
    }

    /// Returns the compact curie of the grounded entity.
    #[must_use]
    pub fn curie(&self) -> String {
        self.key().curie()
    }

    /// Returns true if this term names a species-specific entity.
    #[must_use]
    pub const fn is_organism_specific(&self) -> bool {
        self.organism.is_some()
    }

    /// Validates the required fields.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyField` if `text`, `norm_text`, `db` or
    /// `id` is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("text", &self.text),
            ("norm_text", &self.norm_text),
            ("db", &self.db),
            ("id", &self.id),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::EmptyField {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}
