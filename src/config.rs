//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::disambiguation::{ContextFeaturizer, DEFAULT_BLEND_FLOOR, DEFAULT_TOKEN_PATTERN};
use crate::error::{LoadError, ValidationError};

/// Tunables of a [`crate::Grounder`].
///
/// Every field has a default, so a partial JSON document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrounderConfig {
    /// Share of the lexical score a candidate keeps when the model gives it
    /// zero probability. Must be in `[0, 1)`.
    pub disambiguation_floor: f32,

    /// Probe squashed and singular variants in addition to the exact key.
    pub approximate_lookup: bool,

    /// Fold matches to the same entity into one.
    pub merge_equivalent: bool,

    /// Regex extracting context tokens for disambiguation models.
    pub context_token_pattern: String,

    /// Longest word n-gram tried by annotation.
    pub max_annotation_ngram: usize,

    /// Longest mention, in characters, accepted through the request
    /// adapters. `None` accepts any length.
    pub max_text_length: Option<usize>,
}

impl Default for GrounderConfig {
    fn default() -> Self {
        Self {
            disambiguation_floor: DEFAULT_BLEND_FLOOR,
            approximate_lookup: true,
            merge_equivalent: true,
            context_token_pattern: DEFAULT_TOKEN_PATTERN.to_string(),
            max_annotation_ngram: 5,
            max_text_length: None,
        }
    }
}

impl GrounderConfig {
    /// Checks value ranges and compiles the token pattern.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` describing the first bad value.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.disambiguation_floor.is_finite() || !(0.0..1.0).contains(&self.disambiguation_floor) {
            return Err(ValidationError::InvalidConfig {
                reason: format!(
                    "disambiguation_floor must be in [0, 1), got {}",
                    self.disambiguation_floor
                ),
            });
        }
        if self.max_annotation_ngram == 0 {
            return Err(ValidationError::InvalidConfig {
                reason: "max_annotation_ngram must be at least 1".to_string(),
            });
        }
        if self.max_text_length == Some(0) {
            return Err(ValidationError::InvalidConfig {
                reason: "max_text_length must be at least 1".to_string(),
            });
        }
        ContextFeaturizer::new(&self.context_token_pattern)?;
        Ok(())
    }

    /// Reads and validates a config from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Io` if the file cannot be read, `LoadError::Json`
    /// if it does not parse, and `LoadError::Validation` for bad values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| LoadError::Json {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        let config = GrounderConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.approximate_lookup);
        assert!(config.merge_equivalent);
        assert_eq!(config.max_text_length, None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GrounderConfig = serde_json::from_str(r#"{"approximate_lookup": false}"#).unwrap();
        assert!(!config.approximate_lookup);
        assert!((config.disambiguation_floor - DEFAULT_BLEND_FLOOR).abs() < f32::EPSILON);
        assert_eq!(config.context_token_pattern, DEFAULT_TOKEN_PATTERN);
    }

    #[test]
    fn test_rejects_bad_values() {
        let floor = GrounderConfig {
            disambiguation_floor: 1.0,
            ..GrounderConfig::default()
        };
        assert!(matches!(floor.validate(), Err(ValidationError::InvalidConfig { .. })));

        let ngram = GrounderConfig {
            max_annotation_ngram: 0,
            ..GrounderConfig::default()
        };
        assert!(ngram.validate().is_err());

        let pattern = GrounderConfig {
            context_token_pattern: "(".to_string(),
            ..GrounderConfig::default()
        };
        assert!(pattern.validate().is_err());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"disambiguation_floor": 0.25, "merge_equivalent": false}}"#).unwrap();
        let config = GrounderConfig::from_json_file(file.path()).unwrap();
        assert!((config.disambiguation_floor - 0.25).abs() < f32::EPSILON);
        assert!(!config.merge_equivalent);

        let missing = GrounderConfig::from_json_file("/nonexistent/grounder.json");
        assert!(matches!(missing, Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_from_json_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"disambiguation_floor": -0.5}}"#).unwrap();
        assert!(matches!(
            GrounderConfig::from_json_file(file.path()),
            Err(LoadError::Validation(_))
        ));
    }
}
