/// Axis-aligned rectangle in integer pixel coordinates, top-left origin.
///
/// `right >= left` and `bottom >= top` by convention; construction does not
/// enforce it because backends occasionally report degenerate boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl Rect {
    pub fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle used for synthetic nodes (root, predicted pages) that have no
    /// geometry of their own.
    pub fn undefined() -> Self {
        Self::new(-1, -1, -1, -1)
    }

    /// Width of the rectangle.
    pub fn width(&self) -> i64 {
        self.right - self.left
    }

    /// Height of the rectangle.
    pub fn height(&self) -> i64 {
        self.bottom - self.top
    }

    /// `(width, height)` pair.
    pub fn size(&self) -> (i64, i64) {
        (self.width(), self.height())
    }

    /// Compute the union of two rectangles.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Shift the rectangle by `(dx, dy)`.
    pub fn translate(&self, dx: i64, dy: i64) -> Rect {
        Rect {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }
}
