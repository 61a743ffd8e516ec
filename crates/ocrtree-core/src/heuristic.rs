//! Feature annotation of whole trees.

use std::fmt;

use tracing::{debug, warn};

use crate::attributes::{AttrValue, FEATURE_KEY};
use crate::box_type::BoxType;
use crate::error::{PrecondCheckError, Result};
use crate::feature::Feature;
use crate::occurrence::Occurrence;
use crate::priority::FeaturePriorities;
use crate::resolver::{annotate_words, line_text};
use crate::tree::BoxTree;

/// Options for [`examine_lines_with`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExamineOptions {
    /// Box types whose children are annotated (default: every line type).
    pub line_types: Vec<BoxType>,
}

impl Default for ExamineOptions {
    fn default() -> Self {
        Self {
            line_types: BoxType::ALL.into_iter().filter(|t| t.is_line()).collect(),
        }
    }
}

/// Every occurrence of every feature in `text`, grouped by feature in the
/// order given.
pub fn find_features(text: &str, features: &[Box<dyn Feature>]) -> Result<Vec<Occurrence>> {
    let mut occurrences = Vec::new();
    for feature in features {
        occurrences.extend(feature.find_occurrences(text)?);
    }
    Ok(occurrences)
}

/// Annotate the words of every line in `tree` with `features`.
///
/// Priorities of existing labels are resolved against the built-in catalog
/// extended with `features`.
pub fn examine_lines(tree: &mut BoxTree, features: &[Box<dyn Feature>]) -> Result<()> {
    let priorities = FeaturePriorities::with_features(features);
    examine_lines_with(tree, features, &priorities, &ExamineOptions::default())
}

/// Annotate the words of every line in `tree` with `features`.
///
/// Every node ends up with a `feature` attribute, `Null` when nothing was
/// found. Running twice with the same features yields the same labels.
pub fn examine_lines_with(
    tree: &mut BoxTree,
    features: &[Box<dyn Feature>],
    priorities: &FeaturePriorities,
    options: &ExamineOptions,
) -> Result<()> {
    if features.is_empty() {
        return Err(PrecondCheckError::EmptyFeatureList.into());
    }

    let nodes: Vec<_> = tree.iter().collect();
    let mut lines = 0;
    for node in nodes {
        if tree[node].attribute(FEATURE_KEY).is_none() {
            tree[node].set_attribute(FEATURE_KEY, AttrValue::Null);
        }
        if !options.line_types.contains(&tree[node].box_type) {
            continue;
        }
        if tree.children(node).is_empty() {
            warn!(line = %node, "line box without words");
            continue;
        }
        lines += 1;
        let text = line_text(tree, node);
        let occurrences = find_features(&text, features)?;
        if !occurrences.is_empty() {
            annotate_words(tree, node, &occurrences, priorities)?;
        }
    }
    debug!(lines, features = features.len(), "examined lines");
    Ok(())
}

/// Occurrences of a set of features in one piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLineAnalysis {
    pub text: String,
    pub occurrences: Vec<Occurrence>,
}

impl TextLineAnalysis {
    pub fn new(text: impl Into<String>, features: &[Box<dyn Feature>]) -> Result<Self> {
        let text = text.into();
        let occurrences = find_features(&text, features)?;
        Ok(Self { text, occurrences })
    }
}

impl fmt::Display for TextLineAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.text)?;
        for occurrence in &self.occurrences {
            write!(f, " {occurrence};")?;
        }
        Ok(())
    }
}
