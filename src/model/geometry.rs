//! Page geometry in PDF user space.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An axis-aligned rectangle with origin at the bottom-left of the page.
///
/// `y` grows upward, so `y1` is the top edge. Construction rejects boxes
/// with `x0 > x1`, `y0 > y1` or non-finite coordinates, which means every
/// `BoundingBox` in the system has non-negative width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoxRepr")]
pub struct BoundingBox {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
}

#[derive(Deserialize)]
struct BoxRepr {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
}

impl TryFrom<BoxRepr> for BoundingBox {
    type Error = Error;

    fn try_from(repr: BoxRepr) -> Result<Self> {
        BoundingBox::new(repr.x0, repr.y0, repr.x1, repr.y1)
    }
}

impl BoundingBox {
    /// Create a bounding box, validating its invariants.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Result<Self> {
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return Err(Error::InvalidGeometry(format!(
                "non-finite coordinate in ({}, {}, {}, {})",
                x0, y0, x1, y1
            )));
        }
        if x0 > x1 || y0 > y1 {
            return Err(Error::InvalidGeometry(format!(
                "inverted box ({}, {}, {}, {})",
                x0, y0, x1, y1
            )));
        }
        Ok(Self { x0, y0, x1, y1 })
    }

    /// Convert a top-left-origin box (as reported by table finders) into
    /// page coordinates: `y0 = page_height - bottom`, `y1 = page_height - top`.
    pub fn from_top_left(x0: f32, top: f32, x1: f32, bottom: f32, page_height: f32) -> Result<Self> {
        Self::new(x0, page_height - bottom, x1, page_height - top)
    }

    /// Left edge.
    pub fn x0(&self) -> f32 {
        self.x0
    }

    /// Bottom edge.
    pub fn y0(&self) -> f32 {
        self.y0
    }

    /// Right edge.
    pub fn x1(&self) -> f32 {
        self.x1
    }

    /// Top edge.
    pub fn y1(&self) -> f32 {
        self.y1
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Center point as `(x, y)`.
    pub fn center(&self) -> (f32, f32) {
        (self.center_x(), self.center_y())
    }

    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Check whether two boxes overlap. Touching edges count as intersecting.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !(self.x1 < other.x0 || self.x0 > other.x1 || self.y1 < other.y0 || self.y0 > other.y1)
    }

    /// Check whether `other` lies entirely inside this box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.x0 <= other.x0 && self.x1 >= other.x1 && self.y0 <= other.y0 && self.y1 >= other.y1
    }

    /// Horizontal overlap as a fraction (0..=1) of the narrower box's width.
    ///
    /// Returns 0 when the boxes do not overlap horizontally or when either
    /// box has zero width.
    pub fn horizontal_overlap(&self, other: &BoundingBox) -> f32 {
        let left = self.x0.max(other.x0);
        let right = self.x1.min(other.x1);
        if left >= right {
            return 0.0;
        }

        let min_width = self.width().min(other.width());
        if min_width == 0.0 {
            return 0.0;
        }

        (right - left) / min_width
    }

    /// Length of the shared vertical extent (0 when disjoint).
    pub fn vertical_overlap(&self, other: &BoundingBox) -> f32 {
        (self.y1.min(other.y1) - self.y0.max(other.y0)).max(0.0)
    }

    /// Signed vertical gap to `other`.
    ///
    /// Zero if the boxes overlap vertically, positive if `other` is above,
    /// negative if `other` is below.
    pub fn vertical_distance(&self, other: &BoundingBox) -> f32 {
        if self.y1 < other.y0 {
            other.y0 - self.y1
        } else if self.y0 > other.y1 {
            other.y1 - self.y0
        } else {
            0.0
        }
    }

    /// Smallest box covering both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Smallest box covering every box in `boxes`, or `None` if empty.
    pub fn enclosing<'a, I>(boxes: I) -> Option<BoundingBox>
    where
        I: IntoIterator<Item = &'a BoundingBox>,
    {
        boxes
            .into_iter()
            .fold(None, |acc: Option<BoundingBox>, b| match acc {
                Some(acc) => Some(acc.union(b)),
                None => Some(*b),
            })
    }
}
