//! Feature configuration files.
//!
//! A configuration file is a JSON array of entries. Every entry names its
//! constructor with a `kind` key; the remaining keys are that constructor's
//! parameters:
//!
//! ```json
//! [
//!   {"kind": "builtin", "name": "Date"},
//!   {"kind": "regex", "name": "Room", "priority": 4, "core": "\\d{3}", "before": "\\s|^", "after": "\\s|$"},
//!   {"kind": "keyword", "name": "Test", "keywords": ["morfologia"], "allow_upper": true},
//!   {"kind": "keyword", "name": "Drug", "keywords_csv": "drugs.csv", "columns": ["name"]},
//!   {"kind": "fuzzy", "name": "Header", "keywords": ["wynik badania"], "costs": "costs.json"}
//! ]
//! ```
//!
//! Relative file paths are resolved against the configuration file's
//! directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::fuzzy::{FuzzyFeature, FuzzyOptions};
use super::keyword::{load_keywords_csv, KeywordFeature, KeywordOptions};
use super::levenshtein::{CostTable, WeightedLevenshtein};
use super::{builtin_feature, Feature, RegexFeature};
use crate::error::{ConfigurationError, Result};

type Constructor = fn(Value, &Path) -> Result<Box<dyn Feature>>;

/// Feature constructors by `kind`.
static REGISTRY: [(&str, Constructor); 4] = [
    ("regex", build_regex),
    ("keyword", build_keyword),
    ("fuzzy", build_fuzzy),
    ("builtin", build_builtin),
];

/// Every accepted `kind` value.
pub fn feature_kinds() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(kind, _)| *kind)
}

fn default_priority() -> i64 {
    5
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegexParams {
    name: String,
    #[serde(default = "default_priority")]
    priority: i64,
    core: String,
    #[serde(default)]
    before: String,
    #[serde(default)]
    after: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct KeywordParams {
    name: String,
    #[serde(default = "default_priority")]
    priority: i64,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    keywords_csv: Option<PathBuf>,
    #[serde(default)]
    columns: Option<Vec<String>>,
    #[serde(default)]
    allow_upper: bool,
    #[serde(default)]
    allow_first_letter_upper: bool,
    #[serde(default)]
    before: String,
    #[serde(default)]
    after: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FuzzyParams {
    name: String,
    #[serde(default = "default_priority")]
    priority: i64,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    keywords_csv: Option<PathBuf>,
    #[serde(default)]
    allow_upper: bool,
    #[serde(default)]
    costs: Option<PathBuf>,
    #[serde(default)]
    options: FuzzyOptions,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BuiltinParams {
    name: String,
}

fn params<T: serde::de::DeserializeOwned>(kind: &str, entry: Value) -> Result<T> {
    serde_json::from_value(entry)
        .map_err(|e| ConfigurationError::Invalid(format!("{kind} feature: {e}")).into())
}

fn keywords_with_csv(
    mut keywords: Vec<String>,
    csv: Option<PathBuf>,
    columns: Option<&[String]>,
    base_dir: &Path,
) -> Result<Vec<String>> {
    if let Some(csv) = csv {
        keywords.extend(load_keywords_csv(base_dir.join(csv), columns)?);
    }
    Ok(keywords)
}

fn build_regex(entry: Value, _base_dir: &Path) -> Result<Box<dyn Feature>> {
    let p: RegexParams = params("regex", entry)?;
    Ok(Box::new(RegexFeature::new(
        p.name, &p.core, &p.before, &p.after, p.priority,
    )?))
}

fn build_keyword(entry: Value, base_dir: &Path) -> Result<Box<dyn Feature>> {
    let p: KeywordParams = params("keyword", entry)?;
    let keywords = keywords_with_csv(p.keywords, p.keywords_csv, p.columns.as_deref(), base_dir)?;
    let options = KeywordOptions {
        allow_upper: p.allow_upper,
        allow_first_letter_upper: p.allow_first_letter_upper,
        before: p.before,
        after: p.after,
    };
    Ok(Box::new(KeywordFeature::new(
        p.name, keywords, p.priority, options,
    )?))
}

fn build_fuzzy(entry: Value, base_dir: &Path) -> Result<Box<dyn Feature>> {
    let p: FuzzyParams = params("fuzzy", entry)?;
    let keywords = keywords_with_csv(p.keywords, p.keywords_csv, None, base_dir)?;
    if keywords.is_empty() {
        return Err(ConfigurationError::NoKeywords(p.name).into());
    }
    let costs = match p.costs {
        Some(path) => CostTable::from_json_file(base_dir.join(path))?,
        None => CostTable::default(),
    };
    Ok(Box::new(FuzzyFeature::with_options(
        p.name,
        keywords,
        p.priority,
        p.allow_upper,
        WeightedLevenshtein::new(costs),
        p.options,
    )))
}

fn build_builtin(entry: Value, _base_dir: &Path) -> Result<Box<dyn Feature>> {
    let p: BuiltinParams = params("builtin", entry)?;
    Ok(Box::new(builtin_feature(&p.name)?))
}

/// Build one feature from a configuration entry.
pub fn build_feature(mut entry: Value, base_dir: &Path) -> Result<Box<dyn Feature>> {
    let kind = entry
        .as_object_mut()
        .and_then(|object| object.remove("kind"))
        .ok_or_else(|| ConfigurationError::Invalid("feature entry without \"kind\"".to_string()))?;
    let kind = kind
        .as_str()
        .ok_or_else(|| ConfigurationError::Invalid(format!("feature kind must be a string, got {kind}")))?;
    let (_, constructor) = REGISTRY
        .iter()
        .find(|(k, _)| *k == kind)
        .ok_or_else(|| ConfigurationError::UnknownKind(kind.to_string()))?;
    let feature = constructor(entry, base_dir)?;
    debug!(kind, feature = feature.name(), "configured feature");
    Ok(feature)
}

/// Build features from the JSON text of a configuration file.
pub fn parse_features(json: &str, base_dir: &Path) -> Result<Vec<Box<dyn Feature>>> {
    let entries = match serde_json::from_str(json)? {
        Value::Array(entries) => entries,
        other => {
            return Err(ConfigurationError::Invalid(format!(
                "feature configuration must be a JSON array, got {other}"
            ))
            .into());
        }
    };
    entries
        .into_iter()
        .map(|entry| build_feature(entry, base_dir))
        .collect()
}

/// Load features from a configuration file.
pub fn load_features(path: impl AsRef<Path>) -> Result<Vec<Box<dyn Feature>>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigurationError::MissingFile(path.display().to_string()).into());
    }
    let json = std::fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_features(&json, base_dir)
}
