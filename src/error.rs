//! Error types for the grounder.
//!
//! All errors are strongly typed using thiserror. Request-level outcomes such
//! as "no grounding found" are never errors; these types cover invalid inputs,
//! resources that cannot be loaded consistently, and worker-pool conditions.

use thiserror::Error;

/// Validation errors that occur during input validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is blank.
    #[error("Required field '{field}' is empty")]
    EmptyField {
        /// Field name.
        field: String,
    },

    /// A field is longer than allowed.
    #[error("Field '{field}' exceeds maximum length of {max_length}")]
    FieldTooLong {
        /// Field name.
        field: String,
        /// Maximum length.
        max_length: usize,
    },

    /// A status string is not a known term status.
    #[error("Unknown term status '{value}'")]
    InvalidStatus {
        /// The rejected value.
        value: String,
    },

    /// A disambiguation model is not well formed.
    #[error("Invalid disambiguation model for '{norm_text}': {reason}")]
    InvalidModel {
        /// Normalized text of the model.
        norm_text: String,
        /// What is wrong.
        reason: String,
    },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong.
        reason: String,
    },
}

/// Errors raised while materializing resources into an engine.
///
/// Every variant is fatal: an engine is never built from partially
/// consistent resources.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A resource file could not be read.
    #[error("Failed to read '{path}': {message}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error message.
        message: String,
    },

    /// A term row could not be parsed.
    #[error("Malformed term row at line {line}: {reason}")]
    MalformedRow {
        /// 1-based line number.
        line: u64,
        /// What is wrong.
        reason: String,
    },

    /// A JSON resource could not be parsed.
    #[error("Malformed JSON resource: {message}")]
    Json {
        /// Underlying error message.
        message: String,
    },

    /// Two models share a normalized text.
    #[error("Duplicate disambiguation model for '{norm_text}'")]
    DuplicateModel {
        /// Normalized text of the model.
        norm_text: String,
    },

    /// A model exists for a text with no terms.
    #[error("Disambiguation model '{norm_text}' has no terms in the index")]
    UnknownModelText {
        /// Normalized text of the model.
        norm_text: String,
    },

    /// A model names an entity that is not a candidate for its text.
    #[error("Disambiguation model '{norm_text}' refers to entity {entity}, which has no term for that text")]
    UnknownModelEntity {
        /// Normalized text of the model.
        norm_text: String,
        /// The entity key.
        entity: String,
    },

    /// The term and name indexes disagree.
    #[error("Term index and name index disagree: {reason}")]
    Inconsistent {
        /// What is wrong.
        reason: String,
    },

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Execution errors from the grounding worker pool.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The request queue is at capacity.
    #[error("Grounding queue is full (capacity {capacity})")]
    QueueFull {
        /// Queue capacity.
        capacity: usize,
    },

    /// The worker pool has shut down.
    #[error("Grounding workers are unavailable")]
    Disconnected,

    /// A request did not complete in time.
    #[error("Grounding timed out after {duration_ms}ms")]
    Timeout {
        /// Elapsed time in milliseconds.
        duration_ms: u64,
    },
}

/// Top-level error type for the grounder.
#[derive(Debug, Error)]
pub enum GroundError {
    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Resources could not be loaded.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// The worker pool failed a request.
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// An unexpected failure.
    #[error("Internal error: {message}")]
    Internal {
        /// Underlying error message.
        message: String,
    },
}

impl GroundError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a load error.
    #[must_use]
    pub const fn is_load(&self) -> bool {
        matches!(self, Self::Load(_))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Returns true if retrying the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Execution(e) => matches!(
                e,
                ExecutionError::QueueFull { .. } | ExecutionError::Timeout { .. }
            ),
            Self::Validation(_) | Self::Load(_) | Self::Internal { .. } => false,
        }
    }
}

/// Result type alias for grounder operations.
pub type GroundResult<T> = Result<T, GroundError>;
