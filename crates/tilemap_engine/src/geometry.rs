use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Pixel coordinate used for layer offsets and object geometry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    pub const ZERO: PointF = PointF { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for PointF {
    fn from((x, y): (f64, f64)) -> Self {
        PointF::new(x, y)
    }
}

impl Add for PointF {
    type Output = PointF;

    fn add(self, rhs: PointF) -> PointF {
        PointF::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for PointF {
    type Output = PointF;

    fn sub(self, rhs: PointF) -> PointF {
        PointF::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeF {
    pub width: f64,
    pub height: f64,
}

impl SizeF {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_null(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

impl From<(f64, f64)> for SizeF {
    fn from((width, height): (f64, f64)) -> Self {
        SizeF::new(width, height)
    }
}

/// Outline of a polygon or polyline object, relative to the object position.
pub type Polygon = Vec<PointF>;

/// Pixel rectangle, used for object bounds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RectF {
    pub origin: PointF,
    pub size: SizeF,
}

impl RectF {
    pub fn new(origin: impl Into<PointF>, size: impl Into<SizeF>) -> Self {
        Self {
            origin: origin.into(),
            size: size.into(),
        }
    }

    pub fn right(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn bottom(&self) -> f64 {
        self.origin.y + self.size.height
    }

    pub fn center(&self) -> PointF {
        PointF::new(self.origin.x + self.size.width / 2.0, self.origin.y + self.size.height / 2.0)
    }

    /// Edges count as inside.
    pub fn contains(&self, point: PointF) -> bool {
        self.origin.x <= point.x && point.x <= self.right() && self.origin.y <= point.y && point.y <= self.bottom()
    }

    pub fn united(&self, other: &RectF) -> RectF {
        let left = self.origin.x.min(other.origin.x);
        let top = self.origin.y.min(other.origin.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        RectF::new((left, top), (right - left, bottom - top))
    }
}

/// Bounding rectangle of the points, `None` for an empty outline.
pub fn polygon_bounds(polygon: &[PointF]) -> Option<RectF> {
    let (first, rest) = polygon.split_first()?;
    let (min, max) = rest.iter().fold((*first, *first), |(min, max), p| {
        (PointF::new(min.x.min(p.x), min.y.min(p.y)), PointF::new(max.x.max(p.x), max.y.max(p.y)))
    });
    Some(RectF::new(min, (max.x - min.x, max.y - min.y)))
}
