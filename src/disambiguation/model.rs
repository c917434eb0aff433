//! Trained disambiguation models.
//!
//! A model is a multinomial linear classifier over context features: each
//! class carries an intercept and sparse token weights, and class scores are
//! turned into probabilities with a softmax. A class without an entity stands
//! for senses the knowledge base cannot ground.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::disambiguation::features::FeatureVector;
use crate::error::ValidationError;
use crate::normalize::normalize;
use crate::term::EntityKey;

/// One output class of a disambiguation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelClass {
    /// Grounded sense, or `None` for the ungrounded sense.
    #[serde(default)]
    pub entity: Option<EntityKey>,

    #[serde(default)]
    pub intercept: f32,

    #[serde(default)]
    pub weights: BTreeMap<String, f32>,
}

impl ModelClass {
    fn score(&self, features: &FeatureVector) -> f64 {
        let mut total = f64::from(self.intercept);
        for (token, value) in features {
            if let Some(w) = self.weights.get(token) {
                total += f64::from(*w) * f64::from(*value);
            }
        }
        total
    }
}

/// Classifier resolving one ambiguous normalized text.
///
/// # Examples
///
/// ```
/// use grounder::disambiguation::{ContextFeaturizer, DisambiguationModel, DEFAULT_TOKEN_PATTERN};
/// use grounder::EntityKey;
///
/// let go = EntityKey::new("GO", "GO:0005783");
/// let esr1 = EntityKey::new("HGNC", "3467");
/// let model = DisambiguationModel::new("ER")
///     .with_class(go.clone(), 0.0, [("calcium", 3.0)])
///     .with_class(esr1.clone(), 0.0, [("estrogen", 3.0)]);
///
/// let featurizer = ContextFeaturizer::new(DEFAULT_TOKEN_PATTERN).unwrap();
/// let prediction = model.predict(&featurizer.featurize("calcium stores"));
/// assert!(prediction.probability(&go) > prediction.probability(&esr1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisambiguationModel {
    /// Normalized text this model disambiguates.
    pub norm_text: String,
    /// Output classes.
    pub classes: Vec<ModelClass>,
}

impl DisambiguationModel {
    /// Creates an empty model for a text; the text is normalized.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            norm_text: normalize(text),
            classes: Vec::new(),
        }
    }

    /// Adds a grounded class.
    #[must_use]
    pub fn with_class<'a>(
        mut self,
        entity: EntityKey,
        intercept: f32,
        weights: impl IntoIterator<Item = (&'a str, f32)>,
    ) -> Self {
        self.classes.push(ModelClass {
            entity: Some(entity),
            intercept,
            weights: weights.into_iter().map(|(t, w)| (t.to_string(), w)).collect(),
        });
        self
    }

    /// Adds the ungrounded class.
    #[must_use]
    pub fn with_ungrounded_class<'a>(
        mut self,
        intercept: f32,
        weights: impl IntoIterator<Item = (&'a str, f32)>,
    ) -> Self {
        self.classes.push(ModelClass {
            entity: None,
            intercept,
            weights: weights.into_iter().map(|(t, w)| (t.to_string(), w)).collect(),
        });
        self
    }

    /// Grounded entities this model can predict.
    pub fn entities(&self) -> impl Iterator<Item = &EntityKey> {
        self.classes.iter().filter_map(|c| c.entity.as_ref())
    }

    /// Validates structure and parameters.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidModel` if the text is blank, fewer
    /// than two classes are present, an entity appears twice, more than one
    /// ungrounded class exists, or any parameter is not finite.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidModel {
            norm_text: self.norm_text.clone(),
            reason: reason.to_string(),
        };

        if self.norm_text.trim().is_empty() {
            return Err(invalid("text is empty"));
        }
        if self.norm_text != normalize(&self.norm_text) {
            return Err(invalid("text is not normalized"));
        }
        if self.classes.len() < 2 {
            return Err(invalid("at least two classes are required"));
        }

        let mut seen: BTreeSet<&EntityKey> = BTreeSet::new();
        let mut ungrounded = 0usize;
        for class in &self.classes {
            match &class.entity {
                Some(key) => {
                    if !seen.insert(key) {
                        return Err(invalid(&format!("entity {key} appears more than once")));
                    }
                }
                None => ungrounded += 1,
            }
            if !class.intercept.is_finite() || class.weights.values().any(|w| !w.is_finite()) {
                return Err(invalid("parameters must be finite"));
            }
        }
        if ungrounded > 1 {
            return Err(invalid("at most one ungrounded class is allowed"));
        }
        Ok(())
    }

    /// Predicts a probability distribution over the model's classes.
    #[must_use]
    pub fn predict(&self, features: &FeatureVector) -> Prediction {
        let scores: Vec<f64> = self.classes.iter().map(|c| c.score(features)).collect();
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f64 = exps.iter().sum();

        let mut probabilities = BTreeMap::new();
        let mut ungrounded = 0.0f32;
        for (class, e) in self.classes.iter().zip(exps) {
            #[allow(clippy::cast_possible_truncation)]
            let p = if total > 0.0 { (e / total) as f32 } else { 0.0 };
            match &class.entity {
                Some(key) => {
                    probabilities.insert(key.clone(), p);
                }
                None => ungrounded = p,
            }
        }

        Prediction {
            probabilities,
            ungrounded,
        }
    }
}

/// Output of a model: probability per grounded entity plus the ungrounded mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Probability per grounded entity.
    pub probabilities: BTreeMap<EntityKey, f32>,
    /// Probability that the mention names something outside the knowledge base.
    pub ungrounded: f32,
}

impl Prediction {
    /// Probability for an entity; entities the model does not know get 0.
    #[must_use]
    pub fn probability(&self, key: &EntityKey) -> f32 {
        self.probabilities.get(key).copied().unwrap_or(0.0)
    }

    /// The most probable grounded entity. Ties resolve to the smallest key.
    #[must_use]
    pub fn best(&self) -> Option<(&EntityKey, f32)> {
        self.probabilities
            .iter()
            .fold(None, |best: Option<(&EntityKey, f32)>, (k, &p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((k, p)),
            })
    }
}
