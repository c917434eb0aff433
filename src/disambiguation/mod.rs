//! Context-based disambiguation of ambiguous mentions.
//!
//! When a normalized text maps to more than one entity and a trained model
//! exists for it, the model's predicted sense probabilities are blended into
//! the lexical scores of the candidates.

mod features;
mod model;
mod store;

pub use features::{ContextFeaturizer, FeatureVector, DEFAULT_TOKEN_PATTERN};
pub use model::{DisambiguationModel, ModelClass, Prediction};
pub use store::{DisambiguationError, ModelStore};

/// Default share of the lexical score kept by a zero-probability candidate.
pub const DEFAULT_BLEND_FLOOR: f32 = 0.1;

/// Blends a lexical score with a sense probability.
///
/// `score = lexical * (floor + (1 - floor) * probability)`
///
/// For `floor` in `[0, 1)` the result is non-decreasing in both inputs and
/// strictly increasing in `probability` for a positive lexical score, so at
/// equal lexical scores a zero-probability candidate always ranks below a
/// nonzero one. Under a uniform distribution every candidate is scaled by
/// the same factor and lexical order is preserved.
#[must_use]
pub fn blend(lexical: f32, probability: f32, floor: f32) -> f32 {
    let p = probability.clamp(0.0, 1.0);
    let floor = floor.clamp(0.0, 1.0);
    (lexical * (floor + (1.0 - floor) * p)).clamp(0.0, 1.0)
}
