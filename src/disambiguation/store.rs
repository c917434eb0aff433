//! Disambiguation model store.
//!
//! Holds at most one model per normalized text. The store is filled while an
//! engine is being built and is read-only once the engine exists.

use std::collections::HashMap;

use thiserror::Error;

use crate::disambiguation::features::ContextFeaturizer;
use crate::disambiguation::model::{DisambiguationModel, Prediction};
use crate::error::LoadError;

/// Conditions under which no prediction can be produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DisambiguationError {
    /// No model is registered for the text.
    #[error("No disambiguation model for '{norm_text}'")]
    ModelUnavailable {
        /// The text that was asked for.
        norm_text: String,
    },

    /// The context carried no usable tokens.
    #[error("Context for '{norm_text}' has no usable tokens")]
    EmptyContext {
        /// The text that was asked for.
        norm_text: String,
    },
}

/// Models keyed by the normalized text they disambiguate.
#[derive(Debug)]
pub struct ModelStore {
    models: HashMap<String, DisambiguationModel>,
    featurizer: ContextFeaturizer,
}

impl ModelStore {
    /// Creates an empty store using the given featurizer.
    #[must_use]
    pub fn new(featurizer: ContextFeaturizer) -> Self {
        Self {
            models: HashMap::new(),
            featurizer,
        }
    }

    /// Validates and registers a model.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Validation` for an invalid model and
    /// `LoadError::DuplicateModel` if the text already has one.
    pub fn insert(&mut self, model: DisambiguationModel) -> Result<(), LoadError> {
        model.validate()?;
        if self.models.contains_key(&model.norm_text) {
            return Err(LoadError::DuplicateModel {
                norm_text: model.norm_text,
            });
        }
        self.models.insert(model.norm_text.clone(), model);
        Ok(())
    }

    /// Returns true if a model is registered for the text.
    #[must_use]
    pub fn has_model(&self, norm_text: &str) -> bool {
        self.models.contains_key(norm_text)
    }

    /// Returns the model registered for the text.
    #[must_use]
    pub fn get(&self, norm_text: &str) -> Option<&DisambiguationModel> {
        self.models.get(norm_text)
    }

    /// Predicts the sense distribution for a text given context.
    ///
    /// # Errors
    ///
    /// Returns `DisambiguationError::ModelUnavailable` when the text has no
    /// model and `DisambiguationError::EmptyContext` when the context yields
    /// no tokens. No distribution is fabricated in either case.
    pub fn predict(&self, norm_text: &str, context: &str) -> Result<Prediction, DisambiguationError> {
        let model = self
            .models
            .get(norm_text)
            .ok_or_else(|| DisambiguationError::ModelUnavailable {
                norm_text: norm_text.to_string(),
            })?;

        let features = self.featurizer.featurize(context);
        if features.is_empty() {
            return Err(DisambiguationError::EmptyContext {
                norm_text: norm_text.to_string(),
            });
        }
        Ok(model.predict(&features))
    }

    /// Every text with a model, sorted.
    #[must_use]
    pub fn available(&self) -> Vec<String> {
        let mut texts: Vec<String> = self.models.keys().cloned().collect();
        texts.sort();
        texts
    }

    /// All registered models, in no particular order.
    pub fn models(&self) -> impl Iterator<Item = &DisambiguationModel> {
        self.models.values()
    }

    /// Number of models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns true if no model is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
