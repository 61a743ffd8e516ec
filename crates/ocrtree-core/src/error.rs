//! Error types for ocrtree.
//!
//! Uses [`thiserror`] for error derivation. [`Error`] is the crate-level error;
//! its three domain variants wrap [`StructureError`], [`PrecondCheckError`] and
//! [`ConfigurationError`] so callers can match on the precise cause. All of them
//! are raised synchronously at the point of violation and never retried.

use thiserror::Error;

use crate::box_type::BoxType;

/// Violations of the box tree shape or of the tabular exchange format.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructureError {
    /// `insert_by_type` found no node of the required ancestor type.
    #[error("unable to insert {box_type:?} box: no {expected:?} ancestor found")]
    NoParentSlot {
        box_type: BoxType,
        expected: Option<BoxType>,
    },
    /// A root-typed node was found inside an inserted subtree.
    #[error("a tree cannot contain two root boxes")]
    SecondRoot,
    /// A node identifier is already registered in the root index.
    #[error("box id {0:?} is already present in the tree")]
    DuplicateId(String),
    /// A non-root box was created or imported without an identifier.
    #[error("non-root box has no id")]
    MissingId,
    /// The fixed leading columns of a table are not the expected ones.
    #[error("wrong column set: expected {expected:?}, found {found:?}")]
    ColumnSet {
        expected: Vec<String>,
        found: Vec<String>,
    },
    /// A table cell could not be parsed into its column's type.
    #[error("invalid value {value:?} in column {column:?} (row {row})")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },
    /// A box type code that does not belong to [`BoxType`].
    #[error("unknown box type code {0}")]
    UnknownBoxType(i64),
    /// The operation is only valid on the root node.
    #[error("operation {0} is only valid on the root box")]
    NotRoot(&'static str),
    /// A node handle or identifier that does not belong to the tree.
    #[error("box {0} not found in tree")]
    NodeNotFound(String),
    /// A child index outside of the parent's child list.
    #[error("child index {index} out of range (parent has {len} children)")]
    ChildIndex { index: usize, len: usize },
    /// A box of the wrong type was supplied where a specific type is required.
    #[error("wrong box format: expected {expected:?}, found {found:?}")]
    WrongBoxType { expected: BoxType, found: BoxType },
}

/// Caller-side contract violations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PrecondCheckError {
    /// The heuristic driver requires at least one feature.
    #[error("feature list required")]
    EmptyFeatureList,
    /// Fuzzy matching operates on single-space separated words only.
    #[error("multiple spaces are not supported: {0:?}")]
    MultipleSpaces(String),
    /// A feature name with no registered priority.
    #[error("cannot determine priority for {0} feature occurrence")]
    UnknownFeature(String),
}

/// Missing or malformed external configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// A required configuration file does not exist.
    #[error("configuration file not found: {0}")]
    MissingFile(String),
    /// A feature configuration entry names an unknown constructor.
    #[error("unknown feature kind {0:?}")]
    UnknownKind(String),
    /// A built-in feature name that is not part of the catalog.
    #[error("unknown built-in feature {0:?}")]
    UnknownBuiltin(String),
    /// An edit-distance cost table with the wrong shape.
    #[error("cost table {table} must have {expected} entries, found {found}")]
    CostTableSize {
        table: String,
        expected: usize,
        found: usize,
    },
    /// A keyword feature was configured without keywords.
    #[error("feature {0:?} has no keywords")]
    NoKeywords(String),
    /// A recognition backend name with no registered constructor.
    #[error("unknown recognition backend {0:?}")]
    UnknownBackend(String),
    /// Any other invalid configuration value.
    #[error("{0}")]
    Invalid(String),
}

/// Crate-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Tree shape or tabular format violation.
    #[error("structure error: {0}")]
    Structure(#[from] StructureError),

    /// Caller contract violation.
    #[error("precondition failed: {0}")]
    Precondition(#[from] PrecondCheckError),

    /// Missing or malformed configuration.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON reading or writing failure.
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A feature pattern that does not compile.
    #[error("invalid pattern: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// Returns the structure error, if this is one.
    pub fn as_structure(&self) -> Option<&StructureError> {
        match self {
            Error::Structure(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the precondition error, if this is one.
    pub fn as_precondition(&self) -> Option<&PrecondCheckError> {
        match self {
            Error::Precondition(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the configuration error, if this is one.
    pub fn as_configuration(&self) -> Option<&ConfigurationError> {
        match self {
            Error::Configuration(e) => Some(e),
            _ => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
