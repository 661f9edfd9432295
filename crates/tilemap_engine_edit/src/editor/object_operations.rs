use std::collections::BTreeMap;

use i18n_embed_fl::fl;

use crate::{FlipDirection, LayerId, MapError, MapObject, ObjectId, PointF, Polygon, RectF, Result, SizeF};

use super::{EditorUndoOp, MapDocument};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RotateDirection {
    Left,
    Right,
}

impl RotateDirection {
    /// Rotation after turning `rotation` by 90 degrees, kept in (-180, 180].
    pub fn rotate(self, rotation: f64) -> f64 {
        match self {
            RotateDirection::Left => {
                let r = rotation - 90.0;
                if r <= -180.0 { r + 360.0 } else { r }
            }
            RotateDirection::Right => {
                let r = rotation + 90.0;
                if r > 180.0 { r - 360.0 } else { r }
            }
        }
    }
}

impl MapDocument {
    pub fn create_object(&mut self, name: impl Into<String>, object_type: impl Into<String>) -> MapObject {
        self.map.create_object(name, object_type)
    }

    /// Appends `object` to `group`.
    pub fn add_object(&mut self, group: LayerId, object: MapObject) -> Result<ObjectId> {
        self.map.object_group(group)?;
        let object_id = object.id();
        self.push_undo_action(EditorUndoOp::AddMapObject {
            group,
            index: None,
            object_id,
            object: Some(object),
            selection: None,
        })?;
        Ok(object_id)
    }

    /// Copies each object into its own group and selects the copies.
    pub fn duplicate_objects(&mut self, objects: &[ObjectId]) -> Result<Vec<ObjectId>> {
        if objects.is_empty() {
            return Ok(Vec::new());
        }

        let mut sources = Vec::with_capacity(objects.len());
        for id in objects {
            let group = self.map.object_group_of(*id).ok_or(MapError::UnknownObject(*id))?;
            let source = self.map.object(*id).ok_or(MapError::UnknownObject(*id))?.clone();
            sources.push((group, source));
        }

        let mut clones = Vec::with_capacity(sources.len());
        let mut operations = Vec::with_capacity(sources.len());
        for (group, source) in sources {
            let clone = self.map.clone_object(&source);
            clones.push(clone.id());
            operations.push(EditorUndoOp::AddMapObject {
                group,
                index: None,
                object_id: clone.id(),
                object: Some(clone),
                selection: None,
            });
        }
        self.push_operations(fl!(crate::LANGUAGE_LOADER, "undo-duplicate_objects", count = objects.len()), operations)?;

        self.set_selected_objects(clones.clone())?;
        Ok(clones)
    }

    pub fn remove_objects(&mut self, objects: &[ObjectId]) -> Result<()> {
        if objects.is_empty() {
            return Ok(());
        }
        self.check_objects(objects)?;

        let operations = objects
            .iter()
            .map(|id| EditorUndoOp::RemoveMapObject {
                object_id: *id,
                group: None,
                index: None,
                object: None,
                selection: None,
            })
            .collect();
        self.push_operations(fl!(crate::LANGUAGE_LOADER, "undo-remove_objects", count = objects.len()), operations)
    }

    /// Moves the objects to the end of `group`, objects already in it stay
    /// where they are. The selection is kept.
    pub fn move_objects_to_group(&mut self, objects: &[ObjectId], group: LayerId) -> Result<()> {
        if objects.is_empty() {
            return Ok(());
        }
        self.map.object_group(group)?;

        let mut operations = Vec::new();
        for id in objects {
            let old_group = self.map.object_group_of(*id).ok_or(MapError::UnknownObject(*id))?;
            if old_group == group {
                continue;
            }
            operations.push(EditorUndoOp::MoveMapObjectToGroup {
                object: *id,
                old_group,
                old_index: None,
                new_group: group,
            });
        }
        self.push_operations(fl!(crate::LANGUAGE_LOADER, "undo-move_objects_to_layer", count = objects.len()), operations)
    }

    /// Moves each contiguous run of the objects one step towards the end of
    /// its group. Runs already at the end stay.
    pub fn move_objects_up(&mut self, objects: &[ObjectId]) -> Result<()> {
        if objects.is_empty() {
            return Ok(());
        }

        let mut operations = Vec::new();
        for (group, ranges) in self.object_ranges(objects)? {
            let len = self.map.object_group(group)?.object_count();
            // top run first, so the runs below keep their indices
            for &(from, count) in ranges.iter().rev() {
                let to = from + count + 1;
                if to <= len {
                    operations.push(EditorUndoOp::ChangeMapObjectsOrder { group, from, to, count });
                }
            }
        }
        self.push_operations(fl!(crate::LANGUAGE_LOADER, "undo-move_objects_up", count = objects.len()), operations)
    }

    pub fn move_objects_down(&mut self, objects: &[ObjectId]) -> Result<()> {
        if objects.is_empty() {
            return Ok(());
        }

        let mut operations = Vec::new();
        for (group, ranges) in self.object_ranges(objects)? {
            for &(from, count) in &ranges {
                if from > 0 {
                    operations.push(EditorUndoOp::ChangeMapObjectsOrder {
                        group,
                        from,
                        to: from - 1,
                        count,
                    });
                }
            }
        }
        self.push_operations(fl!(crate::LANGUAGE_LOADER, "undo-move_objects_down", count = objects.len()), operations)
    }

    /// Checks that every object belongs to the map.
    fn check_objects(&self, objects: &[ObjectId]) -> Result<()> {
        for id in objects {
            self.map.object(*id).ok_or(MapError::UnknownObject(*id))?;
        }
        Ok(())
    }

    /// Applies `operations` as one macro. A failing operation reverts the
    /// ones applied before it and nothing is added to the history.
    pub(crate) fn push_operations(&mut self, description: String, operations: Vec<EditorUndoOp>) -> Result<()> {
        if operations.is_empty() {
            return Ok(());
        }
        let mut guard = self.begin_atomic_undo(description)?;
        for op in operations {
            if let Err(err) = self.push_undo_action(op) {
                guard.discard_and_undo(self);
                return Err(err);
            }
        }
        guard.end();
        Ok(())
    }

    /// Contiguous index runs `(first, count)` of the objects, per group and in
    /// ascending order.
    fn object_ranges(&self, objects: &[ObjectId]) -> Result<BTreeMap<LayerId, Vec<(usize, usize)>>> {
        let mut indices: BTreeMap<LayerId, Vec<usize>> = BTreeMap::new();
        for id in objects {
            let group = self.map.object_group_of(*id).ok_or(MapError::UnknownObject(*id))?;
            let index = self.map.object_index(*id).ok_or(MapError::UnknownObject(*id))?;
            indices.entry(group).or_default().push(index);
        }

        let mut ranges = BTreeMap::new();
        for (group, mut indices) in indices {
            indices.sort_unstable();
            indices.dedup();
            let mut runs: Vec<(usize, usize)> = Vec::new();
            for index in indices {
                match runs.last_mut() {
                    Some((first, count)) if *first + *count == index => *count += 1,
                    _ => runs.push((index, 1)),
                }
            }
            ranges.insert(group, runs);
        }
        Ok(ranges)
    }

    pub fn rotate_selected_objects(&mut self, direction: RotateDirection) -> Result<()> {
        if self.selected_objects.is_empty() {
            return Ok(());
        }
        let selected = self.selected_objects.clone();
        let mut operations = Vec::with_capacity(selected.len());
        for id in &selected {
            let old = self.map.object(*id).ok_or(MapError::UnknownObject(*id))?.rotation;
            operations.push(EditorUndoOp::RotateMapObject {
                object: *id,
                old,
                new: direction.rotate(old),
            });
        }
        self.push_operations(fl!(crate::LANGUAGE_LOADER, "undo-rotate_objects", count = selected.len()), operations)
    }

    /// Mirrors the selected objects at the center of their combined bounds.
    pub fn flip_selected_objects(&mut self, direction: FlipDirection) -> Result<()> {
        let objects = self.selected_objects.clone();
        let mut bounds: Option<RectF> = None;
        for id in &objects {
            let object_bounds = self.map.object(*id).ok_or(MapError::UnknownObject(*id))?.bounds();
            bounds = Some(bounds.map_or(object_bounds, |b| b.united(&object_bounds)));
        }
        let Some(bounds) = bounds else {
            return Ok(());
        };

        self.push_undo_action(EditorUndoOp::FlipMapObjects {
            objects,
            direction,
            origin: bounds.center(),
        })
    }

    pub fn set_object_position(&mut self, object: ObjectId, position: PointF) -> Result<()> {
        let old = self.map.object(object).ok_or(MapError::UnknownObject(object))?.position;
        if old == position {
            return Ok(());
        }
        self.push_undo_action(EditorUndoOp::MoveMapObject { object, old, new: position })
    }

    pub fn set_object_size(&mut self, object: ObjectId, size: SizeF) -> Result<()> {
        let old = self.map.object(object).ok_or(MapError::UnknownObject(object))?.size;
        if old == size {
            return Ok(());
        }
        self.push_undo_action(EditorUndoOp::ResizeMapObject { object, old, new: size })
    }

    pub fn set_object_polygon(&mut self, object: ObjectId, polygon: Polygon) -> Result<()> {
        let old = &self.map.object(object).ok_or(MapError::UnknownObject(object))?.polygon;
        if *old == polygon {
            return Ok(());
        }
        let old = old.clone();
        self.push_undo_action(EditorUndoOp::ChangeMapObjectPolygon { object, old, new: polygon })
    }

    pub fn set_object_visible(&mut self, object: ObjectId, visible: bool) -> Result<()> {
        let old = self.map.object(object).ok_or(MapError::UnknownObject(object))?.visible;
        if old == visible {
            return Ok(());
        }
        self.push_undo_action(EditorUndoOp::SetMapObjectVisible { object, old, new: visible })
    }

    /// Changes name and type of an object in one step.
    pub fn change_object(&mut self, object: ObjectId, name: &str, object_type: &str) -> Result<()> {
        let o = self.map.object(object).ok_or(MapError::UnknownObject(object))?;
        if o.name == name && o.object_type == object_type {
            return Ok(());
        }
        let op = EditorUndoOp::ChangeMapObject {
            object,
            old_name: o.name.clone(),
            old_type: o.object_type.clone(),
            new_name: name.to_string(),
            new_type: object_type.to_string(),
        };
        self.push_undo_action(op)
    }
}
