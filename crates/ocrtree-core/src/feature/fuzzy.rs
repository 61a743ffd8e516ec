//! Fuzzy keyword matching over sliding word windows.
//!
//! For every run of 1 to [`FuzzyOptions::max_window_words`] consecutive
//! words, the window text is compared with every keyword that has the same
//! number of words and a similar length. A cheap optimal-string-alignment
//! distance rejects hopeless windows first; the survivors are scored with the
//! [`WeightedLevenshtein`] distance `d` and accepted when `d == 0` or, for
//! windows longer than one character,
//!
//! ```text
//! (d * reference_length / window_length) ^ distance_power <= 1
//! ```

use std::collections::HashMap;

use tracing::debug;

use super::levenshtein::WeightedLevenshtein;
use super::Feature;
use crate::error::{PrecondCheckError, Result};
use crate::occurrence::Occurrence;

/// Tuning constants of [`FuzzyFeature`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FuzzyOptions {
    /// Longest window, in words (default: 20).
    pub max_window_words: usize,
    /// Keywords whose length differs from the window by more than this many
    /// characters are not scored (default: 2).
    pub allowed_length_difference: usize,
    /// Window length at which a distance of 1.0 is still accepted
    /// (default: 4.0).
    pub reference_length: f64,
    /// Exponent scaling the accepted distance with window length
    /// (default: 0.5, so a window four times longer tolerates twice the
    /// distance).
    pub distance_power: f64,
}

impl Default for FuzzyOptions {
    fn default() -> Self {
        Self {
            max_window_words: 20,
            allowed_length_difference: 2,
            reference_length: 4.0,
            distance_power: 0.5,
        }
    }
}

/// Maximum unweighted distance a window may have to its closest keyword
/// before it is scored at all.
fn prefilter_bound(window_len: usize) -> usize {
    match window_len {
        0..=3 => 1,
        4..=6 => 2,
        _ => 3,
    }
}

/// Keyword feature tolerant to recognition errors.
#[derive(Debug, Clone)]
pub struct FuzzyFeature {
    name: String,
    priority: i64,
    keywords: Vec<String>,
    // (word count, char length) -> keywords
    by_shape: HashMap<(usize, usize), Vec<String>>,
    distance: WeightedLevenshtein,
    options: FuzzyOptions,
}

impl FuzzyFeature {
    /// Build a fuzzy feature with the default cost table and options.
    pub fn new(
        name: impl Into<String>,
        keywords: impl IntoIterator<Item = impl Into<String>>,
        priority: i64,
        allow_upper: bool,
    ) -> Self {
        Self::with_options(
            name,
            keywords,
            priority,
            allow_upper,
            WeightedLevenshtein::default(),
            FuzzyOptions::default(),
        )
    }

    pub fn with_options(
        name: impl Into<String>,
        keywords: impl IntoIterator<Item = impl Into<String>>,
        priority: i64,
        allow_upper: bool,
        distance: WeightedLevenshtein,
        options: FuzzyOptions,
    ) -> Self {
        let name = name.into();
        let mut keywords: Vec<String> = keywords.into_iter().map(Into::into).collect();
        if allow_upper {
            let upper: Vec<String> = keywords.iter().map(|k| k.to_uppercase()).collect();
            keywords.extend(upper);
        }
        keywords.sort();
        keywords.dedup();

        let mut by_shape: HashMap<(usize, usize), Vec<String>> = HashMap::new();
        for keyword in &keywords {
            let shape = (keyword.split(' ').count(), keyword.chars().count());
            by_shape.entry(shape).or_default().push(keyword.clone());
        }
        debug!(feature = %name, keywords = keywords.len(), "built fuzzy feature");
        Self {
            name,
            priority,
            keywords,
            by_shape,
            distance,
            options,
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn options(&self) -> &FuzzyOptions {
        &self.options
    }

    fn accepts(&self, distance: f64, window_len: usize) -> bool {
        if distance == 0.0 {
            return true;
        }
        window_len > 1
            && (distance * self.options.reference_length / window_len as f64)
                .powf(self.options.distance_power)
                <= 1.0
    }

    fn window_occurrences(
        &self,
        full_text: &str,
        window: &str,
        word_count: usize,
        start: usize,
        out: &mut Vec<Occurrence>,
    ) {
        let window_len = window.chars().count();
        if window_len == 0 {
            return;
        }
        let bound = prefilter_bound(window_len);
        if !self
            .keywords
            .iter()
            .any(|k| strsim::osa_distance(window, k) <= bound)
        {
            return;
        }

        let slack = self.options.allowed_length_difference;
        let shortest = window_len.saturating_sub(slack).max(1);
        for keyword_len in shortest..window_len + slack {
            let Some(candidates) = self.by_shape.get(&(word_count, keyword_len)) else {
                continue;
            };
            for keyword in candidates {
                let distance = self.distance.distance(window, keyword);
                if self.accepts(distance, window_len) {
                    out.push(
                        Occurrence::new(
                            full_text,
                            &self.name,
                            start,
                            start + window_len,
                            window,
                            self.priority,
                        )
                        .with_info(keyword.as_str()),
                    );
                }
            }
        }
    }
}

impl Feature for FuzzyFeature {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i64 {
        self.priority
    }

    /// Occurrences ordered by window size, then position. Input with two
    /// consecutive spaces is rejected.
    fn find_occurrences(&self, text: &str) -> Result<Vec<Occurrence>> {
        if text.contains("  ") {
            return Err(PrecondCheckError::MultipleSpaces(text.to_string()).into());
        }
        let words: Vec<&str> = text.split(' ').collect();
        let mut occurrences = Vec::new();
        for word_count in 1..=self.options.max_window_words.min(words.len()) {
            let mut start = 0;
            for (i, window) in words.windows(word_count).enumerate() {
                let window_text = window.join(" ");
                self.window_occurrences(text, &window_text, word_count, start, &mut occurrences);
                start += words[i].chars().count() + 1;
            }
        }
        Ok(occurrences)
    }
}
