//! The grounding engine.
//!
//! A [`Grounder`] owns the term index, the reverse name index and the
//! disambiguation models. It is built once by [`GrounderBuilder`], which
//! refuses to produce an engine from inconsistent resources, and is
//! read-only afterwards: every query method takes `&self`, so one engine can
//! be shared across threads behind an `Arc` without locks.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::GrounderConfig;
use crate::disambiguation::{ContextFeaturizer, DisambiguationError, DisambiguationModel, ModelStore};
use crate::error::LoadError;
use crate::index::TermIndex;
use crate::matches::{merge_equivalent, MatchMetadata, ScoredMatch};
use crate::names::ReverseNameIndex;
use crate::normalize::normalize;
use crate::organism::{reorder, OrganismPriorityList};
use crate::resources::fingerprint;
use crate::scorer;
use crate::term::{EntityKey, Term, TermStatus};

/// A single grounding request.
///
/// # Examples
///
/// ```
/// use grounder::GroundQuery;
///
/// let query = GroundQuery::new("EGFR")
///     .context("EGFR is a receptor tyrosine kinase.")
///     .organisms(["9606", "10090"])
///     .namespaces(["HGNC", "UP"]);
/// assert_eq!(query.organisms.as_slice(), ["9606", "10090"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GroundQuery {
    /// The mention to ground.
    pub text: String,
    /// Surrounding text used for disambiguation.
    pub context: Option<String>,
    /// Species preference for tie-breaking.
    pub organisms: OrganismPriorityList,
    /// Namespaces to keep; empty keeps all.
    pub namespaces: Vec<String>,
}

impl GroundQuery {
    /// Creates a query for a mention with no context and no preferences.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            context: None,
            organisms: OrganismPriorityList::default(),
            namespaces: Vec::new(),
        }
    }

    /// Sets the context text.
    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Sets the organism priority list.
    #[must_use]
    pub fn organisms<I, S>(mut self, organisms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.organisms = OrganismPriorityList::new(organisms);
        self
    }

    /// Restricts candidates to the given namespaces.
    #[must_use]
    pub fn namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces = namespaces.into_iter().map(Into::into).collect();
        self
    }

    fn usable_context(&self) -> Option<&str> {
        self.context.as_deref().filter(|c| !c.trim().is_empty())
    }

    fn allows(&self, db: &str) -> bool {
        self.namespaces.is_empty() || self.namespaces.iter().any(|ns| ns == db)
    }
}

/// Summary of a built engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineInfo {
    /// Number of registered terms.
    pub terms: usize,
    /// Number of distinct entities.
    pub entities: usize,
    /// Number of distinct normalized texts.
    pub norm_texts: usize,
    /// Number of disambiguation models.
    pub models: usize,
    /// BLAKE3 fingerprint of the loaded resources.
    pub fingerprint: String,
    /// When the engine was built.
    pub loaded_at: DateTime<Utc>,
}

/// Collects resources and configuration for a [`Grounder`].
#[derive(Debug, Default)]
pub struct GrounderBuilder {
    config: GrounderConfig,
    terms: Vec<Term>,
    models: Vec<DisambiguationModel>,
}

impl GrounderBuilder {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn config(mut self, config: GrounderConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds one term.
    #[must_use]
    pub fn term(mut self, term: Term) -> Self {
        self.terms.push(term);
        self
    }

    /// Adds terms in registration order.
    #[must_use]
    pub fn terms(mut self, terms: impl IntoIterator<Item = Term>) -> Self {
        self.terms.extend(terms);
        self
    }

    /// Adds one disambiguation model.
    #[must_use]
    pub fn model(mut self, model: DisambiguationModel) -> Self {
        self.models.push(model);
        self
    }

    /// Adds disambiguation models.
    #[must_use]
    pub fn models(mut self, models: impl IntoIterator<Item = DisambiguationModel>) -> Self {
        self.models.extend(models);
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// Returns a `LoadError` if the configuration or any term or model is
    /// invalid, if a model's text has no terms, if a model names an entity
    /// with no term for that text, if two models share a text, or if the term
    /// and name indexes disagree on the entity set.
    pub fn build(self) -> Result<Grounder, LoadError> {
        let Self { config, terms, models } = self;
        config.validate()?;
        let featurizer = ContextFeaturizer::new(&config.context_token_pattern)?;
        let fingerprint = fingerprint(&terms, &models);

        let index = TermIndex::build(terms)?;
        let names = ReverseNameIndex::build(index.terms());

        let indexed = index.entity_keys();
        let named = names.entity_keys();
        if indexed != named {
            return Err(LoadError::Inconsistent {
                reason: format!(
                    "{} entities in term index, {} in name index",
                    indexed.len(),
                    named.len()
                ),
            });
        }

        let mut store = ModelStore::new(featurizer);
        for model in models {
            model.validate()?;
            if !index.contains(&model.norm_text) {
                return Err(LoadError::UnknownModelText {
                    norm_text: model.norm_text,
                });
            }
            let candidates: BTreeSet<EntityKey> =
                index.lookup(&model.norm_text).into_iter().map(Term::key).collect();
            if let Some(unknown) = model.entities().find(|k| !candidates.contains(*k)) {
                return Err(LoadError::UnknownModelEntity {
                    norm_text: model.norm_text.clone(),
                    entity: unknown.to_string(),
                });
            }
            store.insert(model)?;
        }

        let info = EngineInfo {
            terms: index.len(),
            entities: indexed.len(),
            norm_texts: index.key_count(),
            models: store.len(),
            fingerprint,
            loaded_at: Utc::now(),
        };
        info!(
            terms = info.terms,
            entities = info.entities,
            models = info.models,
            fingerprint = %info.fingerprint,
            "grounder built"
        );

        Ok(Grounder {
            config,
            index,
            names,
            models: store,
            info,
        })
    }
}

/// Entity grounding engine.
///
/// # Examples
///
/// ```
/// use grounder::{GrounderBuilder, Term, TermStatus};
///
/// let grounder = GrounderBuilder::new()
///     .term(Term::new("EGFR", "HGNC", "3236", "EGFR", TermStatus::Name, "hgnc"))
///     .build()
///     .unwrap();
///
/// let matches = grounder.ground("EGFR", None, &[]);
/// assert_eq!(matches[0].term.id, "3236");
/// assert!(grounder.ground("not a gene", None, &[]).is_empty());
/// ```
#[derive(Debug)]
pub struct Grounder {
    config: GrounderConfig,
    index: TermIndex,
    names: ReverseNameIndex,
    models: ModelStore,
    info: EngineInfo,
}

impl Grounder {
    /// Starts a builder.
    #[must_use]
    pub fn builder() -> GrounderBuilder {
        GrounderBuilder::new()
    }

    /// Grounds a mention, optionally with context and species preference.
    ///
    /// Matches are sorted by score descending. An empty or unknown mention
    /// yields an empty list.
    #[must_use]
    pub fn ground(&self, text: &str, context: Option<&str>, organisms: &[&str]) -> Vec<ScoredMatch> {
        let mut query = GroundQuery::new(text).organisms(organisms.iter().copied());
        query.context = context.map(str::to_string);
        self.execute(&query)
    }

    /// Grounds a mention and returns only the top match.
    #[must_use]
    pub fn ground_best(&self, text: &str, context: Option<&str>, organisms: &[&str]) -> Option<ScoredMatch> {
        self.ground(text, context, organisms).into_iter().next()
    }

    /// Runs a full grounding query.
    #[must_use]
    pub fn execute(&self, query: &GroundQuery) -> Vec<ScoredMatch> {
        let norm = normalize(&query.text);
        if norm.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<ScoredMatch> = self
            .index
            .candidates(&norm, self.config.approximate_lookup)
            .into_iter()
            .filter(|c| query.allows(&c.term.db))
            .map(|c| {
                let lexical = scorer::score_with_norm(&query.text, &norm, c.term);
                ScoredMatch::new(
                    c.term.clone(),
                    MatchMetadata::lexical(query.text.as_str(), lexical, c.lookup),
                )
            })
            .collect();
        if matches.is_empty() {
            debug!(text = %query.text, "no candidates");
            return Vec::new();
        }
        let candidates = matches.len();

        let disambiguated = self.disambiguate(&norm, query, &mut matches);
        if self.config.merge_equivalent {
            matches = merge_equivalent(matches);
        }
        let matches = reorder(matches, &query.organisms);

        debug!(
            text = %query.text,
            candidates,
            matches = matches.len(),
            disambiguated,
            "grounded mention"
        );
        matches
    }

    fn disambiguate(&self, norm: &str, query: &GroundQuery, matches: &mut [ScoredMatch]) -> bool {
        let Some(context) = query.usable_context() else {
            return false;
        };
        let entities: BTreeSet<EntityKey> = matches.iter().map(ScoredMatch::key).collect();
        if entities.len() < 2 {
            return false;
        }

        let Some(model) = self.model_key(norm, matches) else {
            return false;
        };

        match self.models.predict(&model, context) {
            Ok(prediction) => {
                for m in matches.iter_mut() {
                    m.apply_prediction(&model, &prediction, self.config.disambiguation_floor);
                }
                true
            }
            Err(DisambiguationError::ModelUnavailable { .. }) => false,
            Err(err @ DisambiguationError::EmptyContext { .. }) => {
                warn!(error = %err, "falling back to lexical scores");
                false
            }
        }
    }

    /// Picks the model for a candidate set: the mention's own text when it has
    /// one, otherwise the single modelled text its candidates were found under.
    fn model_key(&self, norm: &str, matches: &[ScoredMatch]) -> Option<String> {
        if self.models.has_model(norm) {
            return Some(norm.to_string());
        }
        let modelled: BTreeSet<&str> = matches
            .iter()
            .map(|m| m.term.norm_text.as_str())
            .filter(|t| self.models.has_model(t))
            .collect();
        if modelled.len() > 1 {
            debug!(mention = norm, models = modelled.len(), "candidates span several models");
            return None;
        }
        modelled.into_iter().next().map(str::to_string)
    }

    /// Distinct names of an entity, optionally filtered by status and source.
    #[must_use]
    pub fn names_for(
        &self,
        db: &str,
        id: &str,
        status: Option<TermStatus>,
        source: Option<&str>,
    ) -> Vec<String> {
        self.names.names_for(db, id, status, source)
    }

    /// Every normalized text with a disambiguation model, sorted.
    #[must_use]
    pub fn available_models(&self) -> Vec<String> {
        self.models.available()
    }

    /// Summary of this engine.
    #[must_use]
    pub fn info(&self) -> &EngineInfo {
        &self.info
    }

    /// The configuration this engine was built with.
    #[must_use]
    pub fn config(&self) -> &GrounderConfig {
        &self.config
    }
}
