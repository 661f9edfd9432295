use serde::{Deserialize, Serialize};

use crate::{MapObject, ObjectId, PointF, RectF};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawOrder {
    #[default]
    TopDown,
    Index,
}

/// Layer payload holding an ordered list of map objects.
///
/// Object order is significant: it is the paint order for `DrawOrder::Index`
/// and the row order the editor presents.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectGroup {
    pub(crate) objects: Vec<MapObject>,
    pub draw_order: DrawOrder,
    pub color: Option<[u8; 3]>,
}

impl ObjectGroup {
    pub fn objects(&self) -> &[MapObject] {
        &self.objects
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn object_at(&self, index: usize) -> Option<&MapObject> {
        self.objects.get(index)
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Appends to a detached group, before it is inserted into a map.
    pub fn add_object(&mut self, object: MapObject) {
        self.objects.push(object);
    }

    /// Moves every object whose center lies in `bounds` by `offset`. With
    /// wrapping, centers leaving the bounds come back in on the other side.
    pub fn offset_objects(&mut self, offset: PointF, bounds: RectF, wrap_x: bool, wrap_y: bool) {
        for object in &mut self.objects {
            let center = object.bounds().center();
            if !bounds.contains(center) {
                continue;
            }

            let mut new_center = center + offset;
            if wrap_x && bounds.size.width > 0.0 {
                new_center.x = bounds.origin.x + (new_center.x - bounds.origin.x).rem_euclid(bounds.size.width);
            }
            if wrap_y && bounds.size.height > 0.0 {
                new_center.y = bounds.origin.y + (new_center.y - bounds.origin.y).rem_euclid(bounds.size.height);
            }
            object.position = object.position + (new_center - center);
        }
    }
}
