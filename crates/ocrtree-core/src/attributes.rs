//! Open-ended per-box attributes.
//!
//! Every box carries a map from attribute name to an [`AttrValue`], a small
//! closed set of scalar variants. Feature labels, page numbers and sizes, and
//! backend metadata all live here.

use std::collections::BTreeMap;
use std::fmt;

/// Attribute map of a box. Keys iterate in sorted order.
pub type Attributes = BTreeMap<String, AttrValue>;

/// Attribute key holding the feature label of a box.
pub const FEATURE_KEY: &str = "feature";
/// Attribute key holding the page number of a predicted page.
pub const PAGE_NUMBER_KEY: &str = "page_number";
/// Attribute key holding the `(height, width)` of a page image.
pub const PAGE_SIZE_KEY: &str = "page_size";
/// Attribute key set on boxes whose children were recomputed by a backend.
pub const RECOMPUTED_OCR_KEY: &str = "recomputed_ocr";

/// A single attribute value.
///
/// `Null` is the explicit "no value" marker. It is distinct from an absent
/// key in memory but both are written as an empty cell in tabular form and
/// compare equal in tree equality.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum AttrValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A two-dimensional extent such as an image shape.
    Shape(i64, i64),
}

impl AttrValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value of an `Int` or `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(i) => Some(*i as f64),
            AttrValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<(i64, i64)> {
        match self {
            AttrValue::Shape(a, b) => Some((*a, *b)),
            _ => None,
        }
    }

    /// Encode the value as a single table cell.
    pub fn to_cell(&self) -> String {
        match self {
            AttrValue::Null => String::new(),
            AttrValue::Bool(true) => "True".to_string(),
            AttrValue::Bool(false) => "False".to_string(),
            AttrValue::Int(i) => i.to_string(),
            AttrValue::Float(f) => format!("{f:?}"),
            AttrValue::Str(s) if needs_quotes(s) => format!("'{s}'"),
            AttrValue::Str(s) => s.clone(),
            AttrValue::Shape(a, b) => format!("({a}, {b})"),
        }
    }

    /// Decode a table cell, inferring the narrowest variant that reproduces
    /// the cell text exactly. Anything else stays a string.
    ///
    /// A cell wrapped in single quotes is always a string with one layer of
    /// quotes removed. [`to_cell`](Self::to_cell) quotes every string that
    /// would otherwise decode as something else, including the empty string.
    pub fn from_cell(cell: &str) -> AttrValue {
        if let Some(inner) = unquote(cell) {
            return AttrValue::Str(inner.to_string());
        }
        infer(cell)
    }
}

fn unquote(cell: &str) -> Option<&str> {
    if cell.len() < 2 {
        return None;
    }
    cell.strip_prefix('\'')?.strip_suffix('\'')
}

fn needs_quotes(s: &str) -> bool {
    unquote(s).is_some() || infer(s) != AttrValue::Str(s.to_string())
}

fn infer(cell: &str) -> AttrValue {
    if cell.is_empty() {
        return AttrValue::Null;
    }
    match cell {
        "True" | "true" => return AttrValue::Bool(true),
        "False" | "false" => return AttrValue::Bool(false),
        _ => {}
    }
    if let Ok(i) = cell.parse::<i64>() {
        if i.to_string() == cell {
            return AttrValue::Int(i);
        }
    }
    if let Ok(f) = cell.parse::<f64>() {
        if format!("{f:?}") == cell {
            return AttrValue::Float(f);
        }
    }
    if let Some(shape) = parse_shape(cell) {
        return shape;
    }
    AttrValue::Str(cell.to_string())
}

fn parse_shape(cell: &str) -> Option<AttrValue> {
    let inner = cell.strip_prefix('(')?.strip_suffix(')')?;
    let (a, b) = inner.split_once(", ")?;
    let a: i64 = a.parse().ok()?;
    let b: i64 = b.parse().ok()?;
    let value = AttrValue::Shape(a, b);
    (value.to_cell() == cell).then_some(value)
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => f.write_str("None"),
            other => f.write_str(&other.to_cell()),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Int(i)
    }
}

impl From<usize> for AttrValue {
    fn from(i: usize) -> Self {
        AttrValue::Int(i as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(f: f64) -> Self {
        AttrValue::Float(f)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<(i64, i64)> for AttrValue {
    fn from((a, b): (i64, i64)) -> Self {
        AttrValue::Shape(a, b)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttrValue::Null, Into::into)
    }
}
