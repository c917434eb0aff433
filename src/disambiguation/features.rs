//! Context featurization.
//!
//! Context text is tokenized with a configurable pattern and turned into an
//! L2-normalized term-frequency vector keyed by token. The pattern must match
//! the one the models were trained with; the default keeps word tokens of two
//! or more characters.

use std::collections::BTreeMap;

use regex::Regex;

use crate::error::ValidationError;
use crate::normalize::normalize;

/// Default token pattern for context text.
pub const DEFAULT_TOKEN_PATTERN: &str = r"\b\w\w+\b";

/// Sparse feature vector: token → weight.
pub type FeatureVector = BTreeMap<String, f32>;

/// Turns context strings into model features.
#[derive(Debug, Clone)]
pub struct ContextFeaturizer {
    pattern: Regex,
}

impl ContextFeaturizer {
    /// Compiles a featurizer from a token pattern.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` if the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self, ValidationError> {
        let pattern = Regex::new(pattern).map_err(|e| ValidationError::InvalidConfig {
            reason: format!("invalid context token pattern '{pattern}': {e}"),
        })?;
        Ok(Self { pattern })
    }

    /// Returns the token pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Tokenizes normalized context text.
    #[must_use]
    pub fn tokens(&self, context: &str) -> Vec<String> {
        let norm = normalize(context);
        self.pattern
            .find_iter(&norm)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Builds the L2-normalized term-frequency vector for a context.
    #[must_use]
    pub fn featurize(&self, context: &str) -> FeatureVector {
        let mut counts: FeatureVector = BTreeMap::new();
        for token in self.tokens(context) {
            *counts.entry(token).or_insert(0.0) += 1.0;
        }

        let norm2: f64 = counts.values().map(|&x| f64::from(x) * f64::from(x)).sum();
        if norm2 > 0.0 {
            #[allow(clippy::cast_possible_truncation)]
            let inv = norm2.sqrt().recip() as f32;
            for x in counts.values_mut() {
                *x *= inv;
            }
        }
        counts
    }
}
