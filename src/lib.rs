//! # grounder - entity grounding and disambiguation
//!
//! Maps free-text mentions of biomedical entities (genes, proteins,
//! chemicals, cellular components) to knowledge-base identifiers. Each
//! candidate term is scored lexically; when a mention is ambiguous across
//! entities and a trained model exists for it, the surrounding context is
//! used to pick the intended sense.
//!
//! ## Core Concepts
//!
//! - **Term**: one registered surface form of an entity, keyed by `(db, id)`
//! - **ScoredMatch**: a candidate term with its final score and a breakdown of how it was scored
//! - **DisambiguationModel**: a per-text classifier over context tokens
//! - **Grounder**: the read-only engine holding terms, names and models
//!
//! ## Usage
//!
//! ```rust
//! use grounder::{DisambiguationModel, EntityKey, GrounderBuilder, Term, TermStatus};
//!
//! let go = EntityKey::new("GO", "GO:0005783");
//! let esr1 = EntityKey::new("HGNC", "3467");
//!
//! let grounder = GrounderBuilder::new()
//!     .term(Term::new("ER", "GO", "GO:0005783", "endoplasmic reticulum", TermStatus::Synonym, "go"))
//!     .term(Term::new("ER", "HGNC", "3467", "ESR1", TermStatus::Synonym, "hgnc"))
//!     .model(
//!         DisambiguationModel::new("ER")
//!             .with_class(go.clone(), 0.0, [("calcium", 2.5)])
//!             .with_class(esr1, 0.0, [("estrogen", 2.5)]),
//!     )
//!     .build()?;
//!
//! let best = grounder.ground_best("ER", Some("Calcium is released from the ER."), &[]);
//! assert_eq!(best.map(|m| m.key()), Some(go));
//! # Ok::<(), grounder::LoadError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod error;
pub mod normalize;
pub mod term;

// Lookup and scoring
pub mod disambiguation;
pub mod index;
pub mod matches;
pub mod names;
pub mod organism;
pub mod scorer;

// Engine and surfaces
pub mod annotate;
pub mod api;
pub mod config;
pub mod grounder;
pub mod resources;
pub mod runtime;

// Re-export primary types at crate root for convenience
pub use annotate::Annotation;
pub use config::GrounderConfig;
pub use disambiguation::{DisambiguationError, DisambiguationModel, ModelStore, Prediction};
pub use error::{ExecutionError, GroundError, GroundResult, LoadError, ValidationError};
pub use grounder::{EngineInfo, GroundQuery, Grounder, GrounderBuilder};
pub use index::{LookupKind, TermIndex};
pub use matches::{DisambiguationInfo, MatchMetadata, ScoredMatch, ScoringPath};
pub use names::ReverseNameIndex;
pub use organism::OrganismPriorityList;
pub use runtime::{GroundHandle, GroundingRuntime, RuntimeConfig};
pub use term::{EntityKey, Term, TermStatus};
