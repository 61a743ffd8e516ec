//! Located feature matches.

use std::fmt;

/// A single match of a feature in a line of text.
///
/// `start..end` is a half-open span counted in characters of `full_text`.
/// Equality and hashing cover every field, so occurrences can be
/// deduplicated with set semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Occurrence {
    /// The text the feature was run on.
    pub full_text: String,
    pub feature_name: String,
    pub start: usize,
    pub end: usize,
    /// `full_text[start..end]`, in characters.
    pub matched_text: String,
    pub priority: i64,
    /// Feature-specific detail, e.g. the keyword a fuzzy match was close to.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub additional_info: Option<String>,
}

impl Occurrence {
    pub fn new(
        full_text: impl Into<String>,
        feature_name: impl Into<String>,
        start: usize,
        end: usize,
        matched_text: impl Into<String>,
        priority: i64,
    ) -> Self {
        Self {
            full_text: full_text.into(),
            feature_name: feature_name.into(),
            start,
            end,
            matched_text: matched_text.into(),
            priority,
            additional_info: None,
        }
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.additional_info = Some(info.into());
        self
    }

    /// Span length in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}..{}] {:?} (priority {})",
            self.feature_name, self.start, self.end, self.matched_text, self.priority
        )
    }
}

/// Byte offset to character offset lookup for one string.
///
/// Regex engines report byte offsets; occurrences are expressed in
/// characters.
pub(crate) struct CharOffsets {
    // (byte offset, char index) of every char start, plus the end of the string
    boundaries: Vec<(usize, usize)>,
}

impl CharOffsets {
    pub(crate) fn new(text: &str) -> Self {
        let mut boundaries: Vec<(usize, usize)> = text
            .char_indices()
            .enumerate()
            .map(|(char_idx, (byte, _))| (byte, char_idx))
            .collect();
        boundaries.push((text.len(), boundaries.len()));
        Self { boundaries }
    }

    /// Character index of a byte offset that lies on a char boundary.
    pub(crate) fn char_index(&self, byte: usize) -> usize {
        match self.boundaries.binary_search_by_key(&byte, |&(b, _)| b) {
            Ok(i) => self.boundaries[i].1,
            Err(i) => i,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equal_occurrences_deduplicate() {
        let a = Occurrence::new("x 123", "Number", 2, 5, "123", 5);
        let b = Occurrence::new("x 123", "Number", 2, 5, "123", 5);
        let c = b.clone().with_info("kw");
        let set: HashSet<Occurrence> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn length() {
        let occ = Occurrence::new("abc", "F", 1, 3, "bc", 1);
        assert_eq!(occ.len(), 2);
        assert!(!occ.is_empty());
    }

    #[test]
    fn char_offsets_skip_multibyte() {
        let text = "ęą x";
        let offsets = CharOffsets::new(text);
        assert_eq!(offsets.char_index(0), 0);
        assert_eq!(offsets.char_index(2), 1);
        assert_eq!(offsets.char_index(4), 2);
        assert_eq!(offsets.char_index(5), 3);
        assert_eq!(offsets.char_index(text.len()), 4);
    }

    #[test]
    fn display() {
        let occ = Occurrence::new("x 123", "Number", 2, 5, "123", 5);
        assert_eq!(occ.to_string(), "Number[2..5] \"123\" (priority 5)");
    }
}
