//! Regular-expression features.

use tracing::debug;

use super::{ContextPattern, Feature};
use crate::error::Result;
use crate::occurrence::Occurrence;

/// A feature defined by a core regex and its required context.
///
/// Occurrences are reported at the span of the core alone. The before-context
/// must match immediately before the core and the after-context immediately
/// after it; neither is part of the occurrence.
#[derive(Debug, Clone)]
pub struct RegexFeature {
    name: String,
    priority: i64,
    core: String,
    before: String,
    after: String,
    pattern: ContextPattern,
}

impl RegexFeature {
    /// Compile a regex feature. An invalid pattern is reported as
    /// [`Error::Regex`](crate::Error::Regex).
    pub fn new(
        name: impl Into<String>,
        core: &str,
        before: &str,
        after: &str,
        priority: i64,
    ) -> Result<Self> {
        let name = name.into();
        let pattern = ContextPattern::new(before, core, after)?;
        debug!(feature = %name, priority, "compiled regex feature");
        Ok(Self {
            name,
            priority,
            core: core.to_string(),
            before: before.to_string(),
            after: after.to_string(),
            pattern,
        })
    }

    pub fn core(&self) -> &str {
        &self.core
    }

    pub fn before(&self) -> &str {
        &self.before
    }

    pub fn after(&self) -> &str {
        &self.after
    }
}

impl Feature for RegexFeature {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i64 {
        self.priority
    }

    fn find_occurrences(&self, text: &str) -> Result<Vec<Occurrence>> {
        Ok(self.pattern.occurrences(text, &self.name, self.priority))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits() -> RegexFeature {
        RegexFeature::new("Digits", r"\d+", r"\s|^", r"\s|$", 5).unwrap()
    }

    #[test]
    fn reports_core_span_only() {
        let found = digits().find_occurrences("x 123").unwrap();
        assert_eq!(found, vec![Occurrence::new("x 123", "Digits", 2, 5, "123", 5)]);
    }

    #[test]
    fn after_context_is_required() {
        assert!(digits().find_occurrences("123-").unwrap().is_empty());
    }

    #[test]
    fn all_matches_left_to_right() {
        let found = digits().find_occurrences("1 22 333").unwrap();
        let spans: Vec<(usize, usize)> = found.iter().map(|o| (o.start, o.end)).collect();
        assert_eq!(spans, vec![(0, 1), (2, 4), (5, 8)]);
    }

    #[test]
    fn empty_context_matches_anywhere() {
        let feature = RegexFeature::new("Digits", r"\d+", "", "", 1).unwrap();
        let found = feature.find_occurrences("ab12cd3").unwrap();
        let matched: Vec<&str> = found.iter().map(|o| o.matched_text.as_str()).collect();
        assert_eq!(matched, vec!["12", "3"]);
    }

    #[test]
    fn invalid_pattern() {
        let err = RegexFeature::new("Bad", r"(\d+", "", "", 1).unwrap_err();
        assert!(matches!(err, crate::Error::Regex(_)));
    }
}
