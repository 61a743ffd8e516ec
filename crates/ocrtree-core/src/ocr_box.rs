//! Box payload: everything a tree node stores except its links.

use crate::attributes::{AttrValue, Attributes, FEATURE_KEY, PAGE_NUMBER_KEY, PAGE_SIZE_KEY};
use crate::box_type::BoxType;
use crate::geometry::Rect;

/// Characters used to mark a feature label that only partially covers a box.
pub const FEATURE_SUFFIX_CHARS: &[char] = &['<', '-', '>'];

/// One recognized region: geometry, text, confidence and attributes.
///
/// Tree links (parent, children) are owned by [`BoxTree`](crate::tree::BoxTree);
/// an `OcrBox` on its own is a detached value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OcrBox {
    /// Stable identifier, unique within a tree. `None` only for the root.
    pub id: Option<String>,
    pub rect: Rect,
    /// Recognition confidence between 0 and 100, if the backend reports one.
    pub conf: Option<f64>,
    /// Recognized text; empty for structural boxes.
    pub text: String,
    pub box_type: BoxType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attributes: Attributes,
}

impl OcrBox {
    /// Create a box with a freshly generated identifier.
    ///
    /// Root boxes never get an identifier.
    pub fn new(box_type: BoxType, rect: Rect, conf: Option<f64>, text: impl Into<String>) -> Self {
        let id = (!box_type.is_root()).then(|| uuid::Uuid::new_v4().to_string());
        Self {
            id,
            rect,
            conf,
            text: text.into(),
            box_type,
            attributes: Attributes::new(),
        }
    }

    /// Box with the given type and text and no geometry.
    pub fn with_text(box_type: BoxType, text: impl Into<String>) -> Self {
        Self::new(box_type, Rect::default(), None, text)
    }

    /// The synthetic root payload.
    pub fn root() -> Self {
        Self {
            id: None,
            rect: Rect::undefined(),
            conf: None,
            text: String::new(),
            box_type: BoxType::Root,
            attributes: Attributes::new(),
        }
    }

    /// A predicted page with its number and optional `(height, width)`.
    pub fn page(page_number: usize, page_size: Option<(i64, i64)>) -> Self {
        let mut page = Self::new(BoxType::PredictedPage, Rect::undefined(), None, "");
        page.set_attribute(PAGE_NUMBER_KEY, page_number);
        page.set_attribute(PAGE_SIZE_KEY, page_size);
        page
    }

    /// Replace the generated identifier with an explicit one.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        if !self.box_type.is_root() {
            self.id = Some(id.into());
        }
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn attribute(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    pub fn width(&self) -> i64 {
        self.rect.width()
    }

    pub fn height(&self) -> i64 {
        self.rect.height()
    }

    /// Text length in characters.
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Feature label including any partial-overlap suffix.
    pub fn feature(&self) -> Option<&str> {
        self.attributes
            .get(FEATURE_KEY)
            .and_then(AttrValue::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Feature label with the partial-overlap suffix removed.
    pub fn main_feature(&self) -> Option<&str> {
        self.feature()
            .map(|label| label.trim_end_matches(FEATURE_SUFFIX_CHARS))
    }

    /// Flattened attribute record: fixed fields followed by every non-null
    /// attribute. Two boxes with equal records are indistinguishable in
    /// tabular form.
    pub fn record(&self, has_children: bool) -> Vec<(String, AttrValue)> {
        let mut record = vec![
            ("left".to_string(), AttrValue::Int(self.rect.left)),
            ("top".to_string(), AttrValue::Int(self.rect.top)),
            ("right".to_string(), AttrValue::Int(self.rect.right)),
            ("bottom".to_string(), AttrValue::Int(self.rect.bottom)),
            ("conf".to_string(), self.conf.into()),
            ("text".to_string(), AttrValue::Str(self.text.clone())),
            ("has_children".to_string(), AttrValue::Bool(has_children)),
            ("box_type".to_string(), AttrValue::Int(self.box_type.code())),
            ("box_id".to_string(), self.id.clone().into()),
        ];
        record.extend(
            self.attributes
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        record
    }
}
