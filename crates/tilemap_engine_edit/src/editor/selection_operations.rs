use serde::{Deserialize, Serialize};

use crate::{DocumentEvent, LayerId, MapError, ObjectId, Region, Result};

use super::{EditorError, EditorUndoOp, MapDocument};

/// Target of the property browser.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrentObject {
    Map,
    Layer(LayerId),
    MapObject(ObjectId),
}

/// Layer and object selection at one point in time, restored when structural
/// operations are undone.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub current_layer: Option<LayerId>,
    pub current_object: Option<CurrentObject>,
    pub selected_objects: Vec<ObjectId>,
}

impl MapDocument {
    pub fn current_layer(&self) -> Option<LayerId> {
        self.current_layer
    }

    pub fn get_current_layer(&self) -> Result<LayerId> {
        match self.current_layer {
            Some(layer) if self.map.contains_layer(layer) => Ok(layer),
            _ => Err(EditorError::CurrentLayerInvalid.into()),
        }
    }

    pub fn set_current_layer(&mut self, layer: Option<LayerId>) -> Result<()> {
        if let Some(layer) = layer {
            if !self.map.contains_layer(layer) {
                return Err(MapError::UnknownLayer(layer).into());
            }
        }
        self.change_current_layer(layer);
        Ok(())
    }

    pub(crate) fn change_current_layer(&mut self, layer: Option<LayerId>) {
        if self.current_layer == layer {
            return;
        }
        self.current_layer = layer;
        self.emit(DocumentEvent::CurrentLayerChanged { layer });

        if let Some(layer) = layer {
            self.change_current_object(Some(CurrentObject::Layer(layer)));
        }
    }

    pub fn current_object(&self) -> Option<CurrentObject> {
        self.current_object
    }

    pub fn set_current_object(&mut self, object: Option<CurrentObject>) -> Result<()> {
        match object {
            Some(CurrentObject::Layer(layer)) if !self.map.contains_layer(layer) => return Err(MapError::UnknownLayer(layer).into()),
            Some(CurrentObject::MapObject(o)) if self.map.object_group_of(o).is_none() => return Err(MapError::UnknownObject(o).into()),
            _ => {}
        }
        self.change_current_object(object);
        Ok(())
    }

    pub(crate) fn change_current_object(&mut self, object: Option<CurrentObject>) {
        if self.current_object == object {
            return;
        }
        self.current_object = object;
        self.emit(DocumentEvent::CurrentObjectChanged { object });
    }

    /// The objects a property editor should act on: all selected objects when
    /// the current object is one of them, otherwise just the current object.
    pub fn current_objects(&self) -> Vec<CurrentObject> {
        match self.current_object {
            Some(CurrentObject::MapObject(_)) if !self.selected_objects.is_empty() => {
                self.selected_objects.iter().map(|o| CurrentObject::MapObject(*o)).collect()
            }
            Some(object) => vec![object],
            None => Vec::new(),
        }
    }

    pub fn selected_area(&self) -> &Region {
        &self.selected_area
    }

    /// Sets the selected tile area directly, without an undo entry.
    pub fn set_selected_area(&mut self, selection: Region) {
        if self.selected_area == selection {
            return;
        }
        let old = std::mem::replace(&mut self.selected_area, selection);
        self.emit(DocumentEvent::SelectedAreaChanged {
            new: self.selected_area.clone(),
            old,
        });
    }

    /// Undoable change of the selected tile area.
    pub fn change_selected_area(&mut self, selection: Region) -> Result<()> {
        if self.selected_area == selection {
            return Ok(());
        }
        let op = EditorUndoOp::ChangeSelectedArea {
            old: self.selected_area.clone(),
            new: selection,
        };
        self.push_undo_action(op)
    }

    pub fn selected_objects(&self) -> &[ObjectId] {
        &self.selected_objects
    }

    pub fn set_selected_objects(&mut self, objects: Vec<ObjectId>) -> Result<()> {
        if let Some(unknown) = objects.iter().find(|o| self.map.object_group_of(**o).is_none()) {
            return Err(MapError::UnknownObject(*unknown).into());
        }
        let single = if objects.len() == 1 { objects.first().copied() } else { None };
        self.selected_objects = objects;
        self.emit(DocumentEvent::SelectedObjectsChanged);

        if let Some(object) = single {
            self.change_current_object(Some(CurrentObject::MapObject(object)));
        }
        Ok(())
    }

    /// Removes the given objects from the selection and unsets the current
    /// object when it is one of them.
    pub fn deselect_objects(&mut self, objects: &[ObjectId]) {
        if let Some(CurrentObject::MapObject(current)) = self.current_object {
            if objects.contains(&current) {
                self.change_current_object(None);
            }
        }

        let count = self.selected_objects.len();
        self.selected_objects.retain(|o| !objects.contains(o));
        if self.selected_objects.len() != count {
            self.emit(DocumentEvent::SelectedObjectsChanged);
        }
    }

    pub fn selection_snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            current_layer: self.current_layer,
            current_object: self.current_object,
            selected_objects: self.selected_objects.clone(),
        }
    }

    /// Restores a snapshot, skipping references that are no longer part of
    /// the map.
    pub fn restore_selection(&mut self, snapshot: &SelectionSnapshot) {
        let current_layer = snapshot.current_layer.filter(|l| self.map.contains_layer(*l));
        self.change_current_layer(current_layer);

        let objects: Vec<ObjectId> = snapshot
            .selected_objects
            .iter()
            .copied()
            .filter(|o| self.map.object_group_of(*o).is_some())
            .collect();
        if objects != self.selected_objects {
            self.selected_objects = objects;
            self.emit(DocumentEvent::SelectedObjectsChanged);
        }

        let current_object = snapshot.current_object.filter(|o| match o {
            CurrentObject::Map => true,
            CurrentObject::Layer(l) => self.map.contains_layer(*l),
            CurrentObject::MapObject(o) => self.map.object_group_of(*o).is_some(),
        });
        self.change_current_object(current_object);
    }

    /// Purges the selection of everything in the layer at `index` of `parent`
    /// before it is taken out of the map.
    ///
    /// A current layer inside the removed subtree moves to the sibling taking
    /// the removed index, else the one below it, else the parent group.
    pub(crate) fn purge_selection_for_layer(&mut self, parent: Option<LayerId>, index: usize) -> Result<()> {
        let siblings = self.map.children(parent)?;
        let Some(removed) = siblings.get(index) else {
            return Err(MapError::IndexOutOfRange { index, len: siblings.len() }.into());
        };
        let removed_id = removed.id();
        let replacement = siblings
            .get(index + 1)
            .or_else(|| index.checked_sub(1).and_then(|i| siblings.get(i)))
            .map(tilemap_engine::Layer::id)
            .or(parent);

        let mut removed_objects = Vec::new();
        removed.visit(&mut |l| {
            if let Some(group) = l.as_object_group() {
                removed_objects.extend(group.objects().iter().map(tilemap_engine::MapObject::id));
            }
        });

        if self.current_layer.is_some_and(|l| self.map.is_in_subtree(l, removed_id)) {
            self.change_current_layer(replacement);
        }

        let current_object_removed = match self.current_object {
            Some(CurrentObject::Layer(l)) => self.map.is_in_subtree(l, removed_id),
            Some(CurrentObject::MapObject(o)) => removed_objects.contains(&o),
            _ => false,
        };
        if current_object_removed {
            self.change_current_object(None);
        }

        self.deselect_objects(&removed_objects);
        Ok(())
    }
}
