//! Feature priority registry.
//!
//! Words annotated in an earlier pass (or read from a file) carry only a
//! feature label. To decide whether a new occurrence may overwrite such a
//! label, its priority is looked up here by name.

use std::collections::HashMap;

use crate::error::PrecondCheckError;
use crate::feature::Feature;
use crate::ocr_box::FEATURE_SUFFIX_CHARS;

/// Priorities of the built-in feature catalog.
pub const BUILTIN_PRIORITIES: [(&str, i64); 4] =
    [("Number", 5), ("PhoneNumber", 7), ("Date", 8), ("PESEL", 10)];

/// Mapping from feature name to priority.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeaturePriorities {
    priorities: HashMap<String, i64>,
}

impl Default for FeaturePriorities {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FeaturePriorities {
    /// Registry without any entry.
    pub fn empty() -> Self {
        Self {
            priorities: HashMap::new(),
        }
    }

    /// Registry seeded with the built-in catalog.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (name, priority) in BUILTIN_PRIORITIES {
            registry.insert(name, priority);
        }
        registry
    }

    /// Built-in catalog plus every feature in `features`.
    ///
    /// A feature reusing a built-in name overrides its priority.
    pub fn with_features(features: &[Box<dyn Feature>]) -> Self {
        let mut registry = Self::builtin();
        registry.extend(features);
        registry
    }

    pub fn insert(&mut self, name: impl Into<String>, priority: i64) {
        self.priorities.insert(name.into(), priority);
    }

    pub fn extend(&mut self, features: &[Box<dyn Feature>]) {
        for feature in features {
            self.insert(feature.name(), feature.priority());
        }
    }

    pub fn len(&self) -> usize {
        self.priorities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.priorities.is_empty()
    }

    /// Priority of a feature label. Partial-overlap suffixes are ignored.
    pub fn priority_of(&self, label: &str) -> Result<i64, PrecondCheckError> {
        let name = label.trim_end_matches(FEATURE_SUFFIX_CHARS);
        self.priorities
            .get(name)
            .copied()
            .ok_or_else(|| PrecondCheckError::UnknownFeature(name.to_string()))
    }
}
