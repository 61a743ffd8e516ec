//! Feature detectors.
//!
//! A [`Feature`] turns a line of text into an ordered list of
//! [`Occurrence`]s. Three detectors are provided:
//!
//! - [`RegexFeature`]: a core pattern guarded by before/after context.
//! - [`KeywordFeature`]: many fixed keywords, prefiltered by a single
//!   multi-pattern automaton.
//! - [`FuzzyFeature`]: keywords matched with a weighted edit distance over
//!   sliding word windows.
//!
//! Features are configured once at construction and are stateless with
//! respect to the searched text.

use std::fmt;
use std::ops::Range;

use ::regex::Regex;

use crate::error::Result;
use crate::occurrence::{CharOffsets, Occurrence};

pub mod builtin;
#[cfg(feature = "serde")]
pub mod config;
pub mod fuzzy;
pub mod keyword;
pub mod levenshtein;
pub mod regex;

pub use builtin::{builtin_feature, builtin_features, BUILTIN_NAMES};
#[cfg(feature = "serde")]
pub use config::{build_feature, feature_kinds, load_features, parse_features};
pub use fuzzy::{FuzzyFeature, FuzzyOptions};
pub use keyword::{load_keywords_csv, KeywordFeature, KeywordOptions};
pub use levenshtein::{CostTable, WeightedLevenshtein};
pub use self::regex::RegexFeature;

/// A named, prioritized pattern detector.
pub trait Feature: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Higher numbers win when occurrences of two features overlap.
    fn priority(&self) -> i64;

    /// Every occurrence of the feature in `text`, in discovery order.
    fn find_occurrences(&self, text: &str) -> Result<Vec<Occurrence>>;
}

/// A core pattern that only matches between a required before-context and a
/// required after-context. Only the core is reported.
///
/// The after-context is matched but not consumed: the next search resumes at
/// the end of the core, so one separator can close a match and open the
/// next one.
#[derive(Debug, Clone)]
pub(crate) struct ContextPattern {
    regex: Regex,
}

impl ContextPattern {
    pub(crate) fn new(before: &str, core: &str, after: &str) -> std::result::Result<Self, ::regex::Error> {
        let regex = Regex::new(&Self::source(before, core, after))?;
        Ok(Self { regex })
    }

    /// Pattern text with the core as capture group 1.
    pub(crate) fn source(before: &str, core: &str, after: &str) -> String {
        format!("(?:{before})({core})(?:{after})")
    }

    /// Byte ranges of every core match, left to right.
    pub(crate) fn core_spans(&self, text: &str) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        let mut pos = 0;
        while pos <= text.len() {
            let Some(caps) = self.regex.captures_at(text, pos) else {
                break;
            };
            let start = caps.get(0).map_or(pos, |m| m.start());
            let consumed_end = match caps.get(1) {
                Some(core) => {
                    spans.push(core.range());
                    core.end()
                }
                None => start,
            };
            pos = if consumed_end > start {
                consumed_end
            } else {
                match text[start..].chars().next() {
                    Some(c) => start + c.len_utf8(),
                    None => break,
                }
            };
        }
        spans
    }

    /// Core matches as occurrences with character offsets.
    pub(crate) fn occurrences(&self, text: &str, name: &str, priority: i64) -> Vec<Occurrence> {
        let offsets = CharOffsets::new(text);
        self.core_spans(text)
            .into_iter()
            .map(|span| {
                Occurrence::new(
                    text,
                    name,
                    offsets.char_index(span.start),
                    offsets.char_index(span.end),
                    &text[span],
                    priority,
                )
            })
            .collect()
    }
}
