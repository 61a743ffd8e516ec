//! ocrtree-core: Backend-independent OCR box trees and feature annotation.
//!
//! This crate provides the document model produced by recognition backends
//! (a [`BoxTree`] of [`OcrBox`]es, from the synthetic root down to words) and
//! the annotation pass that labels words with the named features found on
//! their lines.
//!
//! # Architecture
//!
//! - **Box tree** ([`tree`], [`tabular`], [`persist`]): arena-backed tree with
//!   a root id index, level-ordered insertion, CSV and JSON exchange formats.
//! - **Features** ([`feature`]): regex, keyword-automaton and fuzzy keyword
//!   detectors producing [`Occurrence`]s, plus a built-in catalog and a JSON
//!   configuration loader.
//! - **Resolution** ([`resolver`], [`heuristic`]): priority-ordered projection
//!   of line occurrences onto word boxes.
//! - **Refinement** ([`refine`]): re-recognition of selected regions through a
//!   [`RecognitionBackend`].

pub mod attributes;
pub mod box_type;
pub mod error;
pub mod feature;
pub mod geometry;
pub mod heuristic;
pub mod occurrence;
pub mod ocr_box;
#[cfg(feature = "serde")]
pub mod persist;
pub mod priority;
pub mod refine;
pub mod resolver;
pub mod tabular;
pub mod tree;

pub use attributes::{AttrValue, Attributes, FEATURE_KEY, PAGE_NUMBER_KEY, PAGE_SIZE_KEY, RECOMPUTED_OCR_KEY};
pub use box_type::BoxType;
pub use error::{ConfigurationError, Error, PrecondCheckError, Result, StructureError};
pub use feature::{
    builtin_feature, builtin_features, CostTable, Feature, FuzzyFeature, FuzzyOptions, KeywordFeature,
    KeywordOptions, RegexFeature, WeightedLevenshtein,
};
#[cfg(feature = "serde")]
pub use feature::{build_feature, load_features, parse_features};
pub use geometry::Rect;
pub use heuristic::{examine_lines, examine_lines_with, find_features, ExamineOptions, TextLineAnalysis};
pub use occurrence::Occurrence;
pub use ocr_box::OcrBox;
pub use priority::FeaturePriorities;
pub use refine::{refine_tree, BackendRegistry, RecognitionBackend};
pub use resolver::{annotate_words, Overlap};
pub use tabular::TabularOptions;
pub use tree::{BoxTree, ConfidenceSummary, NodeId};
