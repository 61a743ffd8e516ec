//! OCR on OCR: re-recognizing selected regions of an existing tree.
//!
//! A first, coarse recognition pass produces a tree; [`refine_tree`] then
//! sends the region of every selected box back through a (usually more
//! precise) [`RecognitionBackend`] and grafts the result in place of the
//! box's children.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info};

use crate::attributes::RECOMPUTED_OCR_KEY;
use crate::box_type::BoxType;
use crate::error::{ConfigurationError, Result};
use crate::geometry::Rect;
use crate::tree::BoxTree;

/// Anything that turns an image (or a region of it) into a box tree.
///
/// `I` is the caller's image type; this crate never looks inside it.
pub trait RecognitionBackend<I: ?Sized> {
    /// Name recorded on refined boxes.
    fn name(&self) -> &str;

    /// Recognize `region` of `image`, or the whole image when `region` is
    /// `None`. Returned geometry is relative to the region's top-left corner.
    fn recognize(&self, image: &I, region: Option<Rect>) -> Result<BoxTree>;
}

/// Re-run `backend` on every box whose type is in `box_types`.
///
/// Boxes are visited in reverse order so that replacing one box's children
/// never disturbs boxes still to be visited. A box whose region yields an
/// empty tree is left untouched; otherwise its children are replaced, its
/// own text is cleared and `recomputed_ocr` is set to the backend name.
/// Returns the number of refined boxes.
pub fn refine_tree<I: ?Sized>(
    tree: &mut BoxTree,
    backend: &dyn RecognitionBackend<I>,
    image: &I,
    box_types: &[BoxType],
) -> Result<usize> {
    let selected: Vec<_> = tree
        .reverse_order(tree.root())
        .filter(|&n| box_types.contains(&tree[n].box_type))
        .collect();

    let mut refined = 0;
    for node in selected {
        let region = tree[node].rect;
        let mut result = backend.recognize(image, Some(region))?;
        if result.is_empty() {
            debug!(node = %node, backend = backend.name(), "nothing recognized in region");
            continue;
        }
        let recognized: Vec<_> = result.iter().skip(1).collect();
        for n in recognized {
            result[n].rect = result[n].rect.translate(region.left, region.top);
        }
        tree.replace_children(node, &result)?;
        let data = &mut tree[node];
        data.text.clear();
        data.set_attribute(RECOMPUTED_OCR_KEY, backend.name());
        refined += 1;
    }
    info!(refined, backend = backend.name(), "refined tree");
    Ok(refined)
}

/// Creates a backend instance.
pub type BackendConstructor<I> = Box<dyn Fn() -> Box<dyn RecognitionBackend<I>> + Send + Sync>;

/// Backends available by name, registered at startup.
pub struct BackendRegistry<I: ?Sized> {
    constructors: BTreeMap<String, BackendConstructor<I>>,
}

impl<I: ?Sized> Default for BackendRegistry<I> {
    fn default() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }
}

impl<I: ?Sized> fmt::Debug for BackendRegistry<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.names())
            .finish()
    }
}

impl<I: ?Sized> BackendRegistry<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor, replacing any previous one with that name.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Box<dyn RecognitionBackend<I>> + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Box::new(constructor));
    }

    /// Instantiate the backend registered as `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn RecognitionBackend<I>>> {
        self.constructors
            .get(name)
            .map(|constructor| constructor())
            .ok_or_else(|| ConfigurationError::UnknownBackend(name.to_string()).into())
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }
}
