//! Resource readers and fingerprinting.
//!
//! Terms are read from a headerless tab-separated file with the columns
//!
//! ```text
//! norm_text  text  db  id  entry_name  status  source  [organism  [source_db  source_id]]
//! ```
//!
//! The `norm_text` column is recomputed from `text` on load. Lines starting
//! with `#` are comments. Models are read from a JSON array of
//! [`DisambiguationModel`] descriptions.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{info, warn};

use crate::disambiguation::DisambiguationModel;
use crate::error::LoadError;
use crate::term::{Term, TermStatus};

const REQUIRED_COLUMNS: usize = 7;

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Reads terms from a TSV file.
///
/// # Errors
///
/// Returns `LoadError::Io` if the file cannot be opened and
/// `LoadError::MalformedRow` for the first row that cannot be parsed.
pub fn read_terms_tsv(path: impl AsRef<Path>) -> Result<Vec<Term>, LoadError> {
    let path = path.as_ref();
    let terms = read_terms(open(path)?)?;
    info!(path = %path.display(), terms = terms.len(), "loaded terms");
    Ok(terms)
}

/// Reads terms from any TSV source.
///
/// Rows whose text normalizes to nothing are skipped with a warning.
///
/// # Errors
///
/// Returns `LoadError::MalformedRow` for a row with fewer than seven
/// columns, an unknown status, or a half-filled source grounding.
pub fn read_terms<R: Read>(reader: R) -> Result<Vec<Term>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut terms = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| LoadError::MalformedRow {
            line: e.position().map_or(0, csv::Position::line),
            reason: e.to_string(),
        })?;
        let line = record.position().map_or(0, csv::Position::line);
        let malformed = |reason: String| LoadError::MalformedRow { line, reason };

        if record.len() < REQUIRED_COLUMNS {
            return Err(malformed(format!(
                "expected at least {REQUIRED_COLUMNS} columns, found {}",
                record.len()
            )));
        }
        let field = |i: usize| record.get(i).map(str::trim).filter(|v| !v.is_empty());
        let column = |i: usize| field(i).unwrap_or_default();

        let status: TermStatus = column(5).parse().map_err(|e| malformed(format!("{e}")))?;
        let mut term = Term::new(column(1), column(2), column(3), column(4), status, column(6));
        if term.norm_text.is_empty() {
            warn!(line, text = column(1), "skipping term with empty normalized text");
            continue;
        }
        if let Some(organism) = field(7) {
            term = term.with_organism(organism);
        }
        match (field(8), field(9)) {
            (Some(db), Some(id)) => term = term.with_source_grounding(db, id),
            (None, None) => {}
            _ => return Err(malformed("source_db and source_id must be given together".to_string())),
        }
        term.validate().map_err(|e| malformed(e.to_string()))?;
        terms.push(term);
    }
    Ok(terms)
}

/// Reads disambiguation models from a JSON file.
///
/// # Errors
///
/// Returns `LoadError::Io` if the file cannot be opened and
/// `LoadError::Json` if its content is not a model array.
pub fn read_models_json(path: impl AsRef<Path>) -> Result<Vec<DisambiguationModel>, LoadError> {
    let path = path.as_ref();
    let models = read_models(BufReader::new(open(path)?))?;
    info!(path = %path.display(), models = models.len(), "loaded disambiguation models");
    Ok(models)
}

/// Reads disambiguation models from any JSON source.
///
/// # Errors
///
/// Returns `LoadError::Json` if the content is not a model array.
pub fn read_models<R: Read>(reader: R) -> Result<Vec<DisambiguationModel>, LoadError> {
    serde_json::from_reader(reader).map_err(|e| LoadError::Json {
        message: e.to_string(),
    })
}

/// BLAKE3 fingerprint of a resource set, as 64 hex characters.
///
/// The fingerprint depends on term and model content and order.
#[must_use]
pub fn fingerprint(terms: &[Term], models: &[DisambiguationModel]) -> String {
    let mut hasher = blake3::Hasher::new();
    let mut field = |value: &str| {
        hasher.update(&(value.len() as u64).to_le_bytes());
        hasher.update(value.as_bytes());
    };

    field("terms");
    for term in terms {
        for value in [
            term.text.as_str(),
            term.db.as_str(),
            term.id.as_str(),
            term.entry_name.as_str(),
            term.status.as_str(),
            term.source.as_str(),
            term.organism.as_deref().unwrap_or_default(),
            term.source_db.as_deref().unwrap_or_default(),
            term.source_id.as_deref().unwrap_or_default(),
        ] {
            field(value);
        }
    }

    field("models");
    for model in models {
        field(&model.norm_text);
        for class in &model.classes {
            match &class.entity {
                Some(key) => field(&key.to_string()),
                None => field(""),
            }
            field(&class.intercept.to_string());
            for (token, weight) in &class.weights {
                field(token);
                field(&weight.to_string());
            }
        }
    }

    hasher.finalize().to_hex().to_string()
}
