//! Keyword features backed by a multi-pattern automaton.
//!
//! All keywords are compiled into one [`RegexSet`], which answers "which
//! keywords occur somewhere in this text" in a single pass. Only those
//! candidates are then re-run as individual [`ContextPattern`]s to recover
//! exact spans.

use std::path::Path;

use regex::{RegexSet, RegexSetBuilder};
use tracing::debug;

use super::{ContextPattern, Feature};
use crate::error::{ConfigurationError, Result};
use crate::occurrence::Occurrence;

// Large keyword lists compile to big automata.
const AUTOMATON_SIZE_LIMIT: usize = 256 * 1024 * 1024;

/// Case variants and context accepted around each keyword.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KeywordOptions {
    /// Also match the keyword in upper case.
    pub allow_upper: bool,
    /// Also match the keyword with its first letter upper-cased.
    pub allow_first_letter_upper: bool,
    /// Regex alternatives accepted right before a keyword, in addition to
    /// whitespace and the start of the text. Must start with `|` when set.
    pub before: String,
    /// Regex alternatives accepted right after a keyword, in addition to
    /// whitespace and the end of the text. Must start with `|` when set.
    pub after: String,
}

impl KeywordOptions {
    fn before_context(&self) -> String {
        format!(r"\s|^{}", self.before)
    }

    fn after_context(&self) -> String {
        format!(r"\s|${}", self.after)
    }

    /// Alternation of the accepted spellings of `keyword`.
    fn spellings(&self, keyword: &str) -> String {
        let mut alternatives = vec![regex::escape(keyword)];
        if self.allow_upper {
            alternatives.push(regex::escape(&keyword.to_uppercase()));
        }
        if self.allow_first_letter_upper {
            let mut chars = keyword.chars();
            if let Some(first) = chars.next() {
                let capitalized: String = first.to_uppercase().chain(chars).collect();
                alternatives.push(regex::escape(&capitalized));
            }
        }
        alternatives.join("|")
    }
}

/// Fixed-keyword feature.
#[derive(Debug, Clone)]
pub struct KeywordFeature {
    name: String,
    priority: i64,
    keywords: Vec<String>,
    options: KeywordOptions,
    candidates: RegexSet,
    patterns: Vec<ContextPattern>,
}

impl KeywordFeature {
    /// Compile a keyword feature. Blank keywords are dropped; an empty list
    /// is a configuration error.
    pub fn new(
        name: impl Into<String>,
        keywords: impl IntoIterator<Item = impl Into<String>>,
        priority: i64,
        options: KeywordOptions,
    ) -> Result<Self> {
        let name = name.into();
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(Into::into)
            .filter(|k: &String| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return Err(ConfigurationError::NoKeywords(name).into());
        }

        let before = options.before_context();
        let after = options.after_context();
        let sources: Vec<String> = keywords
            .iter()
            .map(|k| ContextPattern::source(&before, &options.spellings(k), &after))
            .collect();
        let candidates = RegexSetBuilder::new(&sources)
            .size_limit(AUTOMATON_SIZE_LIMIT)
            .build()?;
        let patterns = keywords
            .iter()
            .map(|k| ContextPattern::new(&before, &options.spellings(k), &after))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(feature = %name, keywords = keywords.len(), "compiled keyword feature");
        Ok(Self {
            name,
            priority,
            keywords,
            options,
            candidates,
            patterns,
        })
    }

    /// Keyword feature reading its keywords from a CSV file.
    pub fn from_csv(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        columns: Option<&[String]>,
        priority: i64,
        options: KeywordOptions,
    ) -> Result<Self> {
        let keywords = load_keywords_csv(path, columns)?;
        Self::new(name, keywords, priority, options)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn options(&self) -> &KeywordOptions {
        &self.options
    }
}

impl Feature for KeywordFeature {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i64 {
        self.priority
    }

    fn find_occurrences(&self, text: &str) -> Result<Vec<Occurrence>> {
        Ok(self
            .candidates
            .matches(text)
            .iter()
            .flat_map(|i| self.patterns[i].occurrences(text, &self.name, self.priority))
            .collect())
    }
}

/// Read keywords from a CSV file with a header row.
///
/// Every non-empty cell of the selected columns (all columns when `columns`
/// is `None`) is a keyword, trimmed, in row-major order.
pub fn load_keywords_csv(path: impl AsRef<Path>, columns: Option<&[String]>) -> Result<Vec<String>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigurationError::MissingFile(path.display().to_string()).into());
    }
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let selected: Vec<usize> = match columns {
        None => (0..headers.len()).collect(),
        Some(names) => names
            .iter()
            .map(|name| {
                headers.iter().position(|h| h == name).ok_or_else(|| {
                    ConfigurationError::Invalid(format!(
                        "column {name:?} not found in {}",
                        path.display()
                    ))
                })
            })
            .collect::<std::result::Result<_, _>>()?,
    };

    let mut keywords = Vec::new();
    for record in reader.records() {
        let record = record?;
        keywords.extend(
            selected
                .iter()
                .filter_map(|&i| record.get(i))
                .map(str::trim)
                .filter(|cell| !cell.is_empty())
                .map(str::to_string),
        );
    }
    Ok(keywords)
}
