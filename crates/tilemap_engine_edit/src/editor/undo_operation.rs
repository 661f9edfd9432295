//! Editor undo operations as serializable enum
//!
//! Every reversible edit of a [`MapDocument`] is one variant. Operations carry
//! the old and the new value, captured when they are created, and apply them
//! through the layer / object models so views see the same notifications as
//! for any other change.

use serde::{Deserialize, Serialize};

use crate::{FlipDirection, Layer, LayerId, MapError, MapObject, ObjectId, PointF, Polygon, Region, Result, SharedTileset, SizeF};

use super::{EditorError, MapDocument, SelectionSnapshot};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerMoveDirection {
    /// Towards the end of the sibling list (drawn later)
    Up,
    Down,
}

impl LayerMoveDirection {
    fn reversed(self) -> Self {
        match self {
            LayerMoveDirection::Up => LayerMoveDirection::Down,
            LayerMoveDirection::Down => LayerMoveDirection::Up,
        }
    }
}

/// Serializable editor undo operation enum
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum EditorUndoOp {
    /// Atomic group of operations
    Atomic { description: String, operations: Vec<EditorUndoOp> },

    /// Insert a layer. `layer` holds it while it is not part of the map.
    AddLayer {
        parent: Option<LayerId>,
        index: usize,
        layer: Option<Layer>,
        #[serde(default)]
        description: Option<String>,
        /// Selection to restore on undo
        #[serde(default)]
        selection: Option<SelectionSnapshot>,
    },

    /// Take the layer at `index` out of the map
    RemoveLayer {
        parent: Option<LayerId>,
        index: usize,
        layer: Option<Layer>,
        #[serde(default)]
        selection: Option<SelectionSnapshot>,
    },

    /// Move a layer one step within its siblings
    MoveLayer { layer: LayerId, direction: LayerMoveDirection },

    /// Swap a layer for an offset copy of it. `replacement` holds whichever
    /// of the two is not in the map.
    OffsetLayer {
        layer: LayerId,
        replacement: Option<Layer>,
        #[serde(default)]
        selection: Option<SelectionSnapshot>,
    },

    SetLayerVisible { layer: LayerId, old: bool, new: bool },
    SetLayerOpacity { layer: LayerId, old: f32, new: f32 },
    SetLayerOffset { layer: LayerId, old: PointF, new: PointF },
    RenameLayer { layer: LayerId, old: String, new: String },

    /// Insert an object, appending it when `index` is `None`
    AddMapObject {
        group: LayerId,
        index: Option<usize>,
        object_id: ObjectId,
        object: Option<MapObject>,
        #[serde(default)]
        selection: Option<SelectionSnapshot>,
    },

    /// Remove an object, `group` and `index` are filled in when applied
    RemoveMapObject {
        object_id: ObjectId,
        group: Option<LayerId>,
        index: Option<usize>,
        object: Option<MapObject>,
        #[serde(default)]
        selection: Option<SelectionSnapshot>,
    },

    /// Name and type change of an object
    ChangeMapObject {
        object: ObjectId,
        old_name: String,
        old_type: String,
        new_name: String,
        new_type: String,
    },

    SetMapObjectVisible { object: ObjectId, old: bool, new: bool },
    MoveMapObject { object: ObjectId, old: PointF, new: PointF },
    ResizeMapObject { object: ObjectId, old: SizeF, new: SizeF },
    RotateMapObject { object: ObjectId, old: f64, new: f64 },
    ChangeMapObjectPolygon { object: ObjectId, old: Polygon, new: Polygon },

    /// Move an object to the end of another object group
    MoveMapObjectToGroup {
        object: ObjectId,
        old_group: LayerId,
        #[serde(default)]
        old_index: Option<usize>,
        new_group: LayerId,
    },

    /// Mirror objects at `origin`, doing it twice restores them
    FlipMapObjects {
        objects: Vec<ObjectId>,
        direction: FlipDirection,
        origin: PointF,
    },

    /// Move `count` objects from `from` to in front of `to`
    ChangeMapObjectsOrder { group: LayerId, from: usize, to: usize, count: usize },

    ChangeSelectedArea { old: Region, new: Region },

    AddTileset { index: usize, tileset: SharedTileset },
    RemoveTileset { index: usize, tileset: Option<SharedTileset> },
    /// Swap the tileset at `index` with `tileset`
    ReplaceTileset { index: usize, tileset: SharedTileset },
}

impl EditorUndoOp {
    /// Get a description of this operation for UI display
    pub fn get_description(&self) -> String {
        use i18n_embed_fl::fl;
        match self {
            EditorUndoOp::Atomic { description, .. } => description.clone(),
            EditorUndoOp::AddLayer { description, .. } => description.clone().unwrap_or_else(|| fl!(crate::LANGUAGE_LOADER, "undo-add_layer")),
            EditorUndoOp::RemoveLayer { .. } => fl!(crate::LANGUAGE_LOADER, "undo-remove_layer"),
            EditorUndoOp::MoveLayer { direction, .. } => match direction {
                LayerMoveDirection::Up => fl!(crate::LANGUAGE_LOADER, "undo-raise_layer"),
                LayerMoveDirection::Down => fl!(crate::LANGUAGE_LOADER, "undo-lower_layer"),
            },
            EditorUndoOp::SetLayerVisible { new, .. } => {
                if *new {
                    fl!(crate::LANGUAGE_LOADER, "undo-show_layer")
                } else {
                    fl!(crate::LANGUAGE_LOADER, "undo-hide_layer")
                }
            }
            EditorUndoOp::OffsetLayer { .. } => fl!(crate::LANGUAGE_LOADER, "undo-offset_layer"),
            EditorUndoOp::SetLayerOpacity { .. } => fl!(crate::LANGUAGE_LOADER, "undo-set_layer_opacity"),
            EditorUndoOp::SetLayerOffset { .. } => fl!(crate::LANGUAGE_LOADER, "undo-set_layer_offset"),
            EditorUndoOp::RenameLayer { .. } => fl!(crate::LANGUAGE_LOADER, "undo-rename_layer"),
            EditorUndoOp::AddMapObject { .. } => fl!(crate::LANGUAGE_LOADER, "undo-add_object"),
            EditorUndoOp::RemoveMapObject { .. } => fl!(crate::LANGUAGE_LOADER, "undo-remove_object"),
            EditorUndoOp::ChangeMapObject { .. } => fl!(crate::LANGUAGE_LOADER, "undo-change_object"),
            EditorUndoOp::SetMapObjectVisible { new, .. } => {
                if *new {
                    fl!(crate::LANGUAGE_LOADER, "undo-show_object")
                } else {
                    fl!(crate::LANGUAGE_LOADER, "undo-hide_object")
                }
            }
            EditorUndoOp::MoveMapObject { .. } => fl!(crate::LANGUAGE_LOADER, "undo-move_object"),
            EditorUndoOp::ResizeMapObject { .. } => fl!(crate::LANGUAGE_LOADER, "undo-resize_object"),
            EditorUndoOp::RotateMapObject { .. } => fl!(crate::LANGUAGE_LOADER, "undo-rotate_object"),
            EditorUndoOp::ChangeMapObjectPolygon { .. } => fl!(crate::LANGUAGE_LOADER, "undo-change_polygon"),
            EditorUndoOp::MoveMapObjectToGroup { .. } => fl!(crate::LANGUAGE_LOADER, "undo-move_object_to_layer"),
            EditorUndoOp::ChangeMapObjectsOrder { .. } => fl!(crate::LANGUAGE_LOADER, "undo-change_objects_order"),
            EditorUndoOp::FlipMapObjects { objects, .. } => fl!(crate::LANGUAGE_LOADER, "undo-flip_objects", count = objects.len()),
            EditorUndoOp::ChangeSelectedArea { .. } => fl!(crate::LANGUAGE_LOADER, "undo-change_selection"),
            EditorUndoOp::AddTileset { .. } => fl!(crate::LANGUAGE_LOADER, "undo-add_tileset"),
            EditorUndoOp::RemoveTileset { .. } => fl!(crate::LANGUAGE_LOADER, "undo-remove_tileset"),
            EditorUndoOp::ReplaceTileset { .. } => fl!(crate::LANGUAGE_LOADER, "undo-replace_tileset"),
        }
    }

    /// Number of operations in a macro, 1 for plain operations.
    pub fn operation_count(&self) -> usize {
        match self {
            EditorUndoOp::Atomic { operations, .. } => operations.len(),
            _ => 1,
        }
    }

    /// Whether this operation changes the map (selection changes don't)
    pub fn changes_data(&self) -> bool {
        match self {
            EditorUndoOp::Atomic { operations, .. } => operations.iter().any(EditorUndoOp::changes_data),
            EditorUndoOp::ChangeSelectedArea { .. } => false,
            _ => true,
        }
    }

    /// Perform the undo operation
    pub fn undo(&mut self, doc: &mut MapDocument) -> Result<()> {
        match self {
            EditorUndoOp::Atomic { operations, .. } => {
                for op in operations.iter_mut().rev() {
                    op.undo(doc)?;
                }
                Ok(())
            }
            EditorUndoOp::AddLayer {
                parent, index, layer, selection, ..
            } => {
                *layer = Some(doc.layer_model_mut().take_layer_at(*parent, *index)?);
                if let Some(selection) = selection.take() {
                    doc.restore_selection(&selection);
                }
                Ok(())
            }
            EditorUndoOp::RemoveLayer {
                parent,
                index,
                layer,
                selection,
            } => {
                let Some(l) = layer.take() else {
                    return Err(EditorError::MissingUndoPayload.into());
                };
                doc.layer_model_mut().insert_layer(*parent, *index, l)?;
                if let Some(selection) = selection.take() {
                    doc.restore_selection(&selection);
                }
                Ok(())
            }
            EditorUndoOp::MoveLayer { layer, direction } => move_layer(doc, *layer, direction.reversed()),
            EditorUndoOp::OffsetLayer {
                layer,
                replacement,
                selection,
            } => {
                swap_layer(doc, layer, replacement)?;
                if let Some(selection) = selection.take() {
                    doc.restore_selection(&selection);
                }
                Ok(())
            }
            EditorUndoOp::SetLayerVisible { layer, old, .. } => doc.layer_model_mut().set_layer_visible(*layer, *old),
            EditorUndoOp::SetLayerOpacity { layer, old, .. } => doc.layer_model_mut().set_layer_opacity(*layer, *old),
            EditorUndoOp::SetLayerOffset { layer, old, .. } => doc.layer_model_mut().set_layer_offset(*layer, *old),
            EditorUndoOp::RenameLayer { layer, old, .. } => doc.layer_model_mut().rename_layer(*layer, old),
            EditorUndoOp::AddMapObject {
                index,
                object_id,
                object,
                selection,
                ..
            } => {
                let (row, removed) = doc.object_model_mut().remove_object(*object_id)?;
                *index = Some(row);
                *object = Some(removed);
                if let Some(selection) = selection.take() {
                    doc.restore_selection(&selection);
                }
                Ok(())
            }
            EditorUndoOp::RemoveMapObject {
                group,
                index,
                object,
                selection,
                ..
            } => {
                let (Some(group), Some(o)) = (*group, object.take()) else {
                    return Err(EditorError::MissingUndoPayload.into());
                };
                doc.object_model_mut().insert_object(group, *index, o)?;
                if let Some(selection) = selection.take() {
                    doc.restore_selection(&selection);
                }
                Ok(())
            }
            EditorUndoOp::ChangeMapObject {
                object, old_name, old_type, ..
            } => {
                let mut model = doc.object_model_mut();
                model.set_object_name(*object, old_name)?;
                model.set_object_type(*object, old_type)
            }
            EditorUndoOp::SetMapObjectVisible { object, old, .. } => doc.object_model_mut().set_object_visible(*object, *old),
            EditorUndoOp::MoveMapObject { object, old, .. } => doc.object_model_mut().set_object_position(*object, *old),
            EditorUndoOp::ResizeMapObject { object, old, .. } => doc.object_model_mut().set_object_size(*object, *old),
            EditorUndoOp::RotateMapObject { object, old, .. } => doc.object_model_mut().set_object_rotation(*object, *old),
            EditorUndoOp::ChangeMapObjectPolygon { object, old, .. } => doc.object_model_mut().set_object_polygon(*object, old),
            EditorUndoOp::MoveMapObjectToGroup {
                object, old_group, old_index, ..
            } => {
                let selection = doc.selection_snapshot();
                let mut model = doc.object_model_mut();
                let (_, o) = model.remove_object(*object)?;
                model.insert_object(*old_group, *old_index, o)?;
                doc.restore_selection(&selection);
                Ok(())
            }
            EditorUndoOp::ChangeMapObjectsOrder { group, from, to, count } => {
                // the moved block now starts at `to` (or `to - count` when moved down the list)
                if *to > *from {
                    doc.object_model_mut().move_objects(*group, *to - *count, *from, *count)
                } else {
                    doc.object_model_mut().move_objects(*group, *to, *from + *count, *count)
                }
            }
            EditorUndoOp::FlipMapObjects { objects, direction, origin } => flip_objects(doc, objects, *direction, *origin),
            EditorUndoOp::ChangeSelectedArea { old, .. } => {
                doc.set_selected_area(old.clone());
                Ok(())
            }
            EditorUndoOp::AddTileset { index, .. } => {
                doc.remove_tileset_at(*index)?;
                Ok(())
            }
            EditorUndoOp::RemoveTileset { index, tileset } => {
                let Some(t) = tileset.take() else {
                    return Err(EditorError::MissingUndoPayload.into());
                };
                doc.insert_tileset(*index, t)
            }
            EditorUndoOp::ReplaceTileset { index, tileset } => swap_tileset(doc, *index, tileset),
        }
    }

    /// Perform the redo operation
    pub fn redo(&mut self, doc: &mut MapDocument) -> Result<()> {
        match self {
            EditorUndoOp::Atomic { operations, .. } => {
                for op in operations.iter_mut() {
                    op.redo(doc)?;
                }
                Ok(())
            }
            EditorUndoOp::AddLayer {
                parent, index, layer, selection, ..
            } => {
                let Some(l) = layer.take() else {
                    return Err(EditorError::MissingUndoPayload.into());
                };
                *selection = Some(doc.selection_snapshot());
                doc.layer_model_mut().insert_layer(*parent, *index, l)
            }
            EditorUndoOp::RemoveLayer {
                parent,
                index,
                layer,
                selection,
            } => {
                *selection = Some(doc.selection_snapshot());
                *layer = Some(doc.layer_model_mut().take_layer_at(*parent, *index)?);
                Ok(())
            }
            EditorUndoOp::MoveLayer { layer, direction } => move_layer(doc, *layer, *direction),
            EditorUndoOp::OffsetLayer {
                layer,
                replacement,
                selection,
            } => {
                *selection = Some(doc.selection_snapshot());
                swap_layer(doc, layer, replacement)
            }
            EditorUndoOp::SetLayerVisible { layer, new, .. } => doc.layer_model_mut().set_layer_visible(*layer, *new),
            EditorUndoOp::SetLayerOpacity { layer, new, .. } => doc.layer_model_mut().set_layer_opacity(*layer, *new),
            EditorUndoOp::SetLayerOffset { layer, new, .. } => doc.layer_model_mut().set_layer_offset(*layer, *new),
            EditorUndoOp::RenameLayer { layer, new, .. } => doc.layer_model_mut().rename_layer(*layer, new),
            EditorUndoOp::AddMapObject {
                group,
                index,
                object,
                selection,
                ..
            } => {
                let Some(o) = object.take() else {
                    return Err(EditorError::MissingUndoPayload.into());
                };
                *selection = Some(doc.selection_snapshot());
                let row = doc.object_model_mut().insert_object(*group, *index, o)?;
                *index = Some(row);
                Ok(())
            }
            EditorUndoOp::RemoveMapObject {
                object_id,
                group,
                index,
                object,
                selection,
            } => {
                *selection = Some(doc.selection_snapshot());
                *group = doc.map().object_group_of(*object_id);
                let (row, removed) = doc.object_model_mut().remove_object(*object_id)?;
                *index = Some(row);
                *object = Some(removed);
                Ok(())
            }
            EditorUndoOp::ChangeMapObject {
                object, new_name, new_type, ..
            } => {
                let mut model = doc.object_model_mut();
                model.set_object_name(*object, new_name)?;
                model.set_object_type(*object, new_type)
            }
            EditorUndoOp::SetMapObjectVisible { object, new, .. } => doc.object_model_mut().set_object_visible(*object, *new),
            EditorUndoOp::MoveMapObject { object, new, .. } => doc.object_model_mut().set_object_position(*object, *new),
            EditorUndoOp::ResizeMapObject { object, new, .. } => doc.object_model_mut().set_object_size(*object, *new),
            EditorUndoOp::RotateMapObject { object, new, .. } => doc.object_model_mut().set_object_rotation(*object, *new),
            EditorUndoOp::ChangeMapObjectPolygon { object, new, .. } => doc.object_model_mut().set_object_polygon(*object, new),
            EditorUndoOp::MoveMapObjectToGroup {
                object,
                old_index,
                new_group,
                ..
            } => {
                let selection = doc.selection_snapshot();
                let mut model = doc.object_model_mut();
                let (row, o) = model.remove_object(*object)?;
                *old_index = Some(row);
                model.insert_object(*new_group, None, o)?;
                doc.restore_selection(&selection);
                Ok(())
            }
            EditorUndoOp::ChangeMapObjectsOrder { group, from, to, count } => doc.object_model_mut().move_objects(*group, *from, *to, *count),
            EditorUndoOp::FlipMapObjects { objects, direction, origin } => flip_objects(doc, objects, *direction, *origin),
            EditorUndoOp::ChangeSelectedArea { new, .. } => {
                doc.set_selected_area(new.clone());
                Ok(())
            }
            EditorUndoOp::AddTileset { index, tileset } => doc.insert_tileset(*index, tileset.clone()),
            EditorUndoOp::RemoveTileset { index, tileset } => {
                *tileset = Some(doc.remove_tileset_at(*index)?);
                Ok(())
            }
            EditorUndoOp::ReplaceTileset { index, tileset } => swap_tileset(doc, *index, tileset),
        }
    }
}

/// Moves a layer one step within its parent, keeping the selection.
fn move_layer(doc: &mut MapDocument, layer: LayerId, direction: LayerMoveDirection) -> Result<()> {
    let parent = doc.map().parent_of(layer)?;
    let index = doc.map().sibling_index(layer)?;
    let len = doc.map().child_count(parent)?;
    let insertion_index = match direction {
        LayerMoveDirection::Up if index + 1 < len => index + 1,
        LayerMoveDirection::Down if index > 0 => index - 1,
        _ => return Err(anyhow::anyhow!("Can't move layer {layer} {direction:?}")),
    };

    let selection = doc.selection_snapshot();
    let mut model = doc.layer_model_mut();
    let taken = model.take_layer_at(parent, index)?;
    model.insert_layer(parent, insertion_index, taken)?;
    doc.restore_selection(&selection);
    Ok(())
}

/// Puts the detached layer in place of `layer` and keeps the one taken out.
fn swap_layer(doc: &mut MapDocument, layer: &mut LayerId, replacement: &mut Option<Layer>) -> Result<()> {
    let Some(new_layer) = replacement.take() else {
        return Err(EditorError::MissingUndoPayload.into());
    };
    let new_id = new_layer.id();
    let replaced = doc.layer_model_mut().replace_layer(*layer, new_layer)?;
    *layer = new_id;
    *replacement = Some(replaced);
    Ok(())
}

fn flip_objects(doc: &mut MapDocument, objects: &[ObjectId], direction: FlipDirection, origin: PointF) -> Result<()> {
    for id in objects {
        let mut flipped = doc.map().object(*id).ok_or(MapError::UnknownObject(*id))?.clone();
        flipped.flip(direction, origin);
        let mut model = doc.object_model_mut();
        model.set_object_position(*id, flipped.position)?;
        model.set_object_polygon(*id, &flipped.polygon)?;
    }
    Ok(())
}

fn swap_tileset(doc: &mut MapDocument, index: usize, tileset: &mut SharedTileset) -> Result<()> {
    *tileset = doc.replace_tileset(index, tileset.clone())?;
    Ok(())
}
