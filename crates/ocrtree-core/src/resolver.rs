//! Occurrence resolution: mapping line-level matches onto word boxes.
//!
//! Features run on the text of a whole line, the words of that line joined
//! by single spaces. [`annotate_words`] projects the resulting occurrences
//! back onto the line's child boxes so that every word ends up with exactly
//! one `feature` attribute:
//!
//! | word vs. occurrence                          | label     |
//! |----------------------------------------------|-----------|
//! | occurrence lies within the word              | `name`    |
//! | occurrence starts before and ends after      | `name-`   |
//! | occurrence starts in the word, ends after    | `name<-`  |
//! | occurrence starts before, ends in the word   | `name->`  |
//!
//! Occurrences are applied from the highest `(priority, length)` down, and a
//! word already labeled with an equal or higher priority is never
//! overwritten. Words no occurrence reaches get an explicit `Null` label.

use tracing::{debug, trace};

use crate::attributes::{AttrValue, FEATURE_KEY};
use crate::error::Result;
use crate::occurrence::Occurrence;
use crate::priority::FeaturePriorities;
use crate::tree::{BoxTree, NodeId};

/// How an occurrence overlaps one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// The occurrence lies entirely within the word.
    Within,
    /// The occurrence covers the word and continues on both sides.
    Through,
    /// The occurrence starts in the word and continues past its end.
    StartsInside,
    /// The occurrence starts before the word and ends inside it.
    EndsInside,
}

impl Overlap {
    /// Classify occurrence `[start, end)` against word span `[word_start,
    /// word_end]`. Comparisons are inclusive on the word side, so an
    /// occurrence ending on the separator right before a word still reaches
    /// it.
    pub fn classify(start: usize, end: usize, word_start: usize, word_end: usize) -> Option<Self> {
        if start >= word_start && end <= word_end {
            Some(Overlap::Within)
        } else if start < word_start && word_end < end {
            Some(Overlap::Through)
        } else if word_start <= start && start <= word_end && word_end < end {
            Some(Overlap::StartsInside)
        } else if start < word_start && word_start <= end && end <= word_end {
            Some(Overlap::EndsInside)
        } else {
            None
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Overlap::Within => "",
            Overlap::Through => "-",
            Overlap::StartsInside => "<-",
            Overlap::EndsInside => "->",
        }
    }

    /// Feature label for a word overlapped this way.
    pub fn label(self, feature_name: &str) -> String {
        format!("{feature_name}{}", self.suffix())
    }
}

/// Children of `line` that take part in the line text, with their
/// `[start, end]` character spans in that text.
pub fn word_spans(tree: &BoxTree, line: NodeId) -> Vec<(NodeId, usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    for &word in tree.children(line) {
        let len = tree[word].text_len();
        if len == 0 {
            continue;
        }
        spans.push((word, start, start + len));
        start += len + 1;
    }
    spans
}

/// The text features are run on: the non-empty child texts of `line` joined
/// by single spaces.
pub fn line_text(tree: &BoxTree, line: NodeId) -> String {
    tree.children(line)
        .iter()
        .map(|&w| tree[w].text.as_str())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Label the children of `line` with the occurrences found on its text.
///
/// Existing labels are looked up in `priorities`; a label with no known
/// priority aborts with [`PrecondCheckError::UnknownFeature`](crate::error::PrecondCheckError::UnknownFeature).
pub fn annotate_words(
    tree: &mut BoxTree,
    line: NodeId,
    occurrences: &[Occurrence],
    priorities: &FeaturePriorities,
) -> Result<()> {
    let words = word_spans(tree, line);
    for child in tree.children(line).to_vec() {
        if tree[child].attribute(FEATURE_KEY).is_none() {
            tree[child].set_attribute(FEATURE_KEY, AttrValue::Null);
        }
    }

    let mut ordered: Vec<&Occurrence> = occurrences.iter().collect();
    ordered.sort_by(|a, b| (b.priority, b.len()).cmp(&(a.priority, a.len())));

    let mut assigned = 0;
    for occurrence in ordered {
        for &(word, word_start, word_end) in &words {
            if let Some(existing) = tree[word].feature() {
                if priorities.priority_of(existing)? >= occurrence.priority {
                    trace!(word = %existing, occurrence = %occurrence, "kept existing label");
                    continue;
                }
            }
            let Some(overlap) =
                Overlap::classify(occurrence.start, occurrence.end, word_start, word_end)
            else {
                continue;
            };
            let label = overlap.label(&occurrence.feature_name);
            trace!(%label, text = %tree[word].text, "labeled word");
            tree[word].set_attribute(FEATURE_KEY, label);
            assigned += 1;
        }
    }
    debug!(
        line = %line,
        occurrences = occurrences.len(),
        assigned,
        "resolved line occurrences"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_type::BoxType;
    use crate::error::PrecondCheckError;
    use crate::ocr_box::OcrBox;

    fn line_with(words: &[&str]) -> (BoxTree, NodeId) {
        let mut tree = BoxTree::new();
        let line = tree
            .add_child(tree.root(), OcrBox::with_text(BoxType::Custom, ""))
            .unwrap();
        for w in words {
            tree.add_child(line, OcrBox::with_text(BoxType::TesseractWord, *w))
                .unwrap();
        }
        (tree, line)
    }

    fn labels(tree: &BoxTree, line: NodeId) -> Vec<Option<String>> {
        tree.children(line)
            .iter()
            .map(|&w| tree[w].feature().map(str::to_string))
            .collect()
    }

    fn priorities() -> FeaturePriorities {
        let mut p = FeaturePriorities::empty();
        p.insert("F", 8);
        p.insert("G", 7);
        p
    }

    fn occ(text: &str, name: &str, start: usize, end: usize, priority: i64) -> Occurrence {
        let matched: String = text.chars().skip(start).take(end - start).collect();
        Occurrence::new(text, name, start, end, matched, priority)
    }

    #[test]
    fn boundary_suffixes() {
        let (mut tree, line) = line_with(&["%", "bazocytów", "C"]);
        let text = line_text(&tree, line);
        assert_eq!(text.chars().count(), 13);
        let occurrences = [occ(&text, "F", 0, 12, 8), occ(&text, "G", 11, 12, 7)];
        annotate_words(&mut tree, line, &occurrences, &priorities()).unwrap();
        assert_eq!(
            labels(&tree, line),
            vec![
                Some("F<-".to_string()),
                Some("F-".to_string()),
                Some("F->".to_string())
            ]
        );
    }

    #[test]
    fn higher_priority_wins_in_either_order() {
        for swap in [false, true] {
            let (mut tree, line) = line_with(&["12", "x"]);
            let text = line_text(&tree, line);
            let mut occurrences = vec![occ(&text, "F", 0, 2, 8), occ(&text, "G", 0, 2, 7)];
            if swap {
                occurrences.reverse();
            }
            annotate_words(&mut tree, line, &occurrences, &priorities()).unwrap();
            assert_eq!(labels(&tree, line), vec![Some("F".to_string()), None]);
        }
    }

    #[test]
    fn longer_match_wins_on_equal_priority() {
        let (mut tree, line) = line_with(&["ab", "cd"]);
        let text = line_text(&tree, line);
        let occurrences = [occ(&text, "G", 0, 2, 7), occ(&text, "G", 0, 5, 7)];
        annotate_words(&mut tree, line, &occurrences, &priorities()).unwrap();
        assert_eq!(
            labels(&tree, line),
            vec![Some("G<-".to_string()), Some("G->".to_string())]
        );
    }

    #[test]
    fn equal_priority_never_overwrites() {
        let (mut tree, line) = line_with(&["ab"]);
        let w = tree.children(line)[0];
        tree[w].set_attribute(FEATURE_KEY, "G");
        let mut p = priorities();
        p.insert("H", 7);
        annotate_words(&mut tree, line, &[occ("ab", "H", 0, 2, 7)], &p).unwrap();
        assert_eq!(labels(&tree, line), vec![Some("G".to_string())]);
    }

    #[test]
    fn untouched_words_get_null_marker() {
        let (mut tree, line) = line_with(&["a", "b"]);
        annotate_words(&mut tree, line, &[], &priorities()).unwrap();
        for &w in tree.children(line) {
            assert_eq!(tree[w].attribute(FEATURE_KEY), Some(&AttrValue::Null));
        }
    }

    #[test]
    fn unknown_existing_label_is_an_error() {
        let (mut tree, line) = line_with(&["12"]);
        let w = tree.children(line)[0];
        tree[w].set_attribute(FEATURE_KEY, "Nonexistent");
        let err = annotate_words(&mut tree, line, &[occ("12", "F", 0, 2, 8)], &priorities())
            .unwrap_err();
        assert_eq!(
            err.as_precondition(),
            Some(&PrecondCheckError::UnknownFeature("Nonexistent".to_string()))
        );
    }

    #[test]
    fn empty_words_are_skipped() {
        let (tree, line) = line_with(&["a", "", "bc"]);
        assert_eq!(line_text(&tree, line), "a bc");
        let spans: Vec<(usize, usize)> = word_spans(&tree, line)
            .into_iter()
            .map(|(_, s, e)| (s, e))
            .collect();
        assert_eq!(spans, vec![(0, 1), (2, 4)]);
    }

    #[test]
    fn classification() {
        assert_eq!(Overlap::classify(2, 4, 2, 5), Some(Overlap::Within));
        assert_eq!(Overlap::classify(0, 9, 2, 5), Some(Overlap::Through));
        assert_eq!(Overlap::classify(3, 9, 2, 5), Some(Overlap::StartsInside));
        assert_eq!(Overlap::classify(0, 4, 2, 5), Some(Overlap::EndsInside));
        assert_eq!(Overlap::classify(7, 9, 2, 5), None);
        assert_eq!(Overlap::EndsInside.label("Date"), "Date->");
    }
}
