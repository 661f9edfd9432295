use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{PointF, Polygon, RectF, SizeF, polygon_bounds};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectShape {
    #[default]
    Rectangle,
    Polygon,
    Polyline,
    Ellipse,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipDirection {
    Horizontal,
    Vertical,
}

/// A positioned, typed entity inside an object group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    id: ObjectId,
    pub name: String,
    pub object_type: String,
    pub position: PointF,
    pub size: SizeF,
    /// Rotation in degrees, clockwise.
    pub rotation: f64,
    pub polygon: Polygon,
    pub shape: ObjectShape,
    pub visible: bool,
}

impl MapObject {
    pub(crate) fn new(id: ObjectId, name: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            object_type: object_type.into(),
            position: PointF::ZERO,
            size: SizeF::default(),
            rotation: 0.0,
            polygon: Vec::new(),
            shape: ObjectShape::default(),
            visible: true,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: ObjectId) {
        self.id = id;
    }

    pub fn with_position(mut self, position: impl Into<PointF>) -> Self {
        self.position = position.into();
        self
    }

    pub fn with_size(mut self, size: impl Into<SizeF>) -> Self {
        self.size = size.into();
        self
    }

    pub fn with_polygon(mut self, shape: ObjectShape, polygon: Polygon) -> Self {
        self.shape = shape;
        self.polygon = polygon;
        self
    }

    /// Pixel bounds. Polygons and polylines are bounded by their points.
    pub fn bounds(&self) -> RectF {
        match polygon_bounds(&self.polygon) {
            Some(outline) => RectF::new(self.position + outline.origin, outline.size),
            None => RectF::new(self.position, self.size),
        }
    }

    /// Mirrors the object at the axis through `origin`. Outlines are
    /// mirrored within their own bounds, so flipping twice is a no-op.
    pub fn flip(&mut self, direction: FlipDirection, origin: PointF) {
        let center = self.bounds().center();
        let mirrored = match direction {
            FlipDirection::Horizontal => PointF::new(2.0 * origin.x - center.x, center.y),
            FlipDirection::Vertical => PointF::new(center.x, 2.0 * origin.y - center.y),
        };
        self.position = self.position + (mirrored - center);

        if let Some(outline) = polygon_bounds(&self.polygon) {
            let outline_center = outline.center();
            for point in &mut self.polygon {
                match direction {
                    FlipDirection::Horizontal => point.x = 2.0 * outline_center.x - point.x,
                    FlipDirection::Vertical => point.y = 2.0 * outline_center.y - point.y,
                }
            }
        }
    }
}
