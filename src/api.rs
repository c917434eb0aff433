//! Transport-agnostic request adapters.
//!
//! These functions carry the JSON contract of the grounding service: a
//! request body in, a response value (or JSON bytes) out, and an [`ApiError`]
//! with an HTTP-style status code for rejected requests. No server is
//! included; any HTTP stack can route to [`dispatch`].
//!
//! | route                  | method       | body                                  | response            |
//! |------------------------|--------------|---------------------------------------|---------------------|
//! | `/ground`              | POST         | `{text, context?, organisms?, namespaces?}` | array of matches |
//! | `/names` (`/get_names`) | POST        | `{db, id, status?, source?}`          | array of strings    |
//! | `/models`              | GET or POST  | none                                  | array of strings    |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ValidationError;
use crate::grounder::{GroundQuery, Grounder};
use crate::matches::ScoredMatch;
use crate::term::TermStatus;

/// Maximum size of a request JSON payload.
pub const MAX_REQUEST_JSON_BYTES: usize = 1024 * 1024;

/// Maximum size of a response JSON payload.
pub const MAX_RESPONSE_JSON_BYTES: usize = 8 * 1024 * 1024;

/// A rejected request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No body, or a blank one.
    #[error("Request body must be JSON")]
    MissingBody,

    /// Body larger than [`MAX_REQUEST_JSON_BYTES`].
    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge {
        /// The limit that was exceeded.
        limit: usize,
    },

    /// Body is not JSON or lacks a required field.
    #[error("Malformed request: {message}")]
    Malformed {
        /// Parser message.
        message: String,
    },

    /// Body parsed but a field is out of range.
    #[error("Invalid request: {0}")]
    Invalid(#[from] ValidationError),

    /// Unknown path.
    #[error("No route for '{path}'")]
    NotFound {
        /// Requested path.
        path: String,
    },

    /// Known path, wrong method.
    #[error("Method {method} not allowed for '{path}'")]
    MethodNotAllowed {
        /// Requested method.
        method: String,
        /// Requested path.
        path: String,
    },

    /// Response could not be encoded.
    #[error("Failed to encode response: {message}")]
    Internal {
        /// Encoder message.
        message: String,
    },
}

impl ApiError {
    /// HTTP status code for this rejection.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::MissingBody => 415,
            Self::PayloadTooLarge { .. } => 413,
            Self::Malformed { .. } | Self::Invalid(_) => 400,
            Self::NotFound { .. } => 404,
            Self::MethodNotAllowed { .. } => 405,
            Self::Internal { .. } => 500,
        }
    }
}

/// Body of a ground request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundRequest {
    /// Mention to ground.
    pub text: String,
    /// Surrounding text used for disambiguation.
    #[serde(default)]
    pub context: Option<String>,
    /// Taxonomy ids in order of preference.
    #[serde(default)]
    pub organisms: Option<Vec<String>>,
    /// Databases to restrict candidates to.
    #[serde(default)]
    pub namespaces: Option<Vec<String>>,
}

impl GroundRequest {
    /// Checks the mention against an optional length limit.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::FieldTooLong` when `max_text_length` is set
    /// and the mention is longer.
    pub fn validate(&self, max_text_length: Option<usize>) -> Result<(), ValidationError> {
        if let Some(max_length) = max_text_length {
            if self.text.chars().count() > max_length {
                return Err(ValidationError::FieldTooLong {
                    field: "text".to_string(),
                    max_length,
                });
            }
        }
        Ok(())
    }

    /// Converts the request into an engine query.
    #[must_use]
    pub fn into_query(self) -> GroundQuery {
        let mut query = GroundQuery::new(self.text)
            .organisms(self.organisms.unwrap_or_default())
            .namespaces(self.namespaces.unwrap_or_default());
        query.context = self.context;
        query
    }
}

/// Body of a names request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamesRequest {
    /// Entity namespace.
    pub db: String,
    /// Entity identifier.
    pub id: String,
    /// Optional status filter, e.g. `"synonym"`.
    #[serde(default)]
    pub status: Option<String>,
    /// Optional source filter.
    #[serde(default)]
    pub source: Option<String>,
}

/// Canonical routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/ground`
    Ground,
    /// `/names`, also served as `/get_names`
    Names,
    /// `/models`
    Models,
}

impl Route {
    /// Resolves a request path. A trailing slash is ignored.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "/ground" => Some(Self::Ground),
            "/names" | "/get_names" => Some(Self::Names),
            "/models" => Some(Self::Models),
            _ => None,
        }
    }

    fn allows(self, method: &str) -> bool {
        match self {
            Self::Ground | Self::Names => method.eq_ignore_ascii_case("POST"),
            Self::Models => method.eq_ignore_ascii_case("GET") || method.eq_ignore_ascii_case("POST"),
        }
    }
}

fn parse_body<T: for<'de> Deserialize<'de>>(body: Option<&[u8]>) -> Result<T, ApiError> {
    let bytes = match body {
        Some(b) if !b.iter().all(u8::is_ascii_whitespace) => b,
        _ => return Err(ApiError::MissingBody),
    };
    if bytes.len() > MAX_REQUEST_JSON_BYTES {
        return Err(ApiError::PayloadTooLarge {
            limit: MAX_REQUEST_JSON_BYTES,
        });
    }
    serde_json::from_slice(bytes).map_err(|e| ApiError::Malformed {
        message: e.to_string(),
    })
}

fn encode_json<T: Serialize>(value: &T) -> Result<Vec<u8>, ApiError> {
    let bytes = serde_json::to_vec(value).map_err(|e| ApiError::Internal {
        message: e.to_string(),
    })?;
    if bytes.len() > MAX_RESPONSE_JSON_BYTES {
        return Err(ApiError::Internal {
            message: format!("response exceeds {MAX_RESPONSE_JSON_BYTES} bytes"),
        });
    }
    Ok(bytes)
}

/// Handles a ground request body.
///
/// # Errors
///
/// Returns `ApiError::MissingBody` without a body, `ApiError::PayloadTooLarge`
/// for an oversized body, `ApiError::Malformed` when the body is not a valid
/// request, and `ApiError::Invalid` for a mention longer than the configured
/// `max_text_length`.
pub fn handle_ground(grounder: &Grounder, body: Option<&[u8]>) -> Result<Vec<ScoredMatch>, ApiError> {
    let request: GroundRequest = parse_body(body)?;
    request.validate(grounder.config().max_text_length)?;
    Ok(grounder.execute(&request.into_query()))
}

/// Handles a names request body.
///
/// An unrecognized `status` filter matches nothing.
///
/// # Errors
///
/// Same rejections as [`handle_ground`].
pub fn handle_names(grounder: &Grounder, body: Option<&[u8]>) -> Result<Vec<String>, ApiError> {
    let request: NamesRequest = parse_body(body)?;
    let status = match request.status.as_deref() {
        None => None,
        Some(raw) => match raw.parse::<TermStatus>() {
            Ok(status) => Some(status),
            Err(_) => return Ok(Vec::new()),
        },
    };
    Ok(grounder.names_for(&request.db, &request.id, status, request.source.as_deref()))
}

/// Lists texts with disambiguation models.
#[must_use]
pub fn handle_models(grounder: &Grounder) -> Vec<String> {
    grounder.available_models()
}

/// Routes a request and returns the JSON response body.
///
/// # Errors
///
/// Returns `ApiError::NotFound` for an unknown path,
/// `ApiError::MethodNotAllowed` for a wrong method, and the handler's
/// rejection otherwise.
pub fn dispatch(
    grounder: &Grounder,
    method: &str,
    path: &str,
    body: Option<&[u8]>,
) -> Result<Vec<u8>, ApiError> {
    let route = Route::from_path(path).ok_or_else(|| ApiError::NotFound {
        path: path.to_string(),
    })?;
    if !route.allows(method) {
        return Err(ApiError::MethodNotAllowed {
            method: method.to_string(),
            path: path.to_string(),
        });
    }
    match route {
        Route::Ground => encode_json(&handle_ground(grounder, body)?),
        Route::Names => encode_json(&handle_names(grounder, body)?),
        Route::Models => encode_json(&handle_models(grounder)),
    }
}
