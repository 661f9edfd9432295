//! Two level tree model: object groups as top level rows, their objects as
//! children.
//!
//! Only top level object groups are rows of this model. Objects of object
//! groups nested in group layers can still be changed through
//! [`MapObjectModelMut`], their domain events fire but no row notifications
//! are sent for them.

use std::collections::HashMap;

use i18n_embed_fl::fl;

use crate::{
    CheckState, DocumentEvent, ItemData, ItemDataRole, ItemFlags, Layer, LayerIcon, LayerId, MapError, MapObject, ModelChange, ModelIndex, ObjectGroup,
    ObjectId, ObjectModelIndex, PointF, Polygon, Result, RowHandle, SizeF,
};
use tilemap_engine::is_valid_move;

use super::{EditorUndoOp, MapDocument};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum RowEntry {
    Group(LayerId),
    Object(ObjectId),
}

/// Identity table behind [`ObjectModelIndex`]: one stable handle per tracked
/// object group and per object of such a group.
#[derive(Clone, Debug, Default)]
pub(crate) struct ObjectRowTable {
    /// Tracked object groups in row order
    object_groups: Vec<LayerId>,
    groups: HashMap<LayerId, RowHandle>,
    objects: HashMap<ObjectId, RowHandle>,
    entries: HashMap<RowHandle, RowEntry>,
    next_handle: u32,
}

impl ObjectRowTable {
    pub(crate) fn from_map(map: &crate::Map) -> Self {
        let mut table = Self::default();
        for layer in map.top_level_layers().iter().filter(|l| l.is_object_group()) {
            table.insert_group(table.object_groups.len(), layer);
        }
        table
    }

    fn alloc(&mut self, entry: RowEntry) -> RowHandle {
        let handle = RowHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.insert(handle, entry);
        handle
    }

    fn insert_group(&mut self, row: usize, layer: &Layer) {
        let handle = self.alloc(RowEntry::Group(layer.id()));
        self.groups.insert(layer.id(), handle);
        self.object_groups.insert(row, layer.id());
        if let Some(group) = layer.as_object_group() {
            for object in group.objects() {
                self.insert_object(object.id());
            }
        }
    }

    fn remove_group(&mut self, layer: &Layer) {
        self.object_groups.retain(|g| *g != layer.id());
        if let Some(handle) = self.groups.remove(&layer.id()) {
            self.entries.remove(&handle);
        }
        if let Some(group) = layer.as_object_group() {
            for object in group.objects() {
                self.remove_object(object.id());
            }
        }
    }

    fn insert_object(&mut self, object: ObjectId) {
        let handle = self.alloc(RowEntry::Object(object));
        self.objects.insert(object, handle);
    }

    fn remove_object(&mut self, object: ObjectId) {
        if let Some(handle) = self.objects.remove(&object) {
            self.entries.remove(&handle);
        }
    }

    fn entry(&self, handle: RowHandle) -> Option<RowEntry> {
        self.entries.get(&handle).copied()
    }

    fn group_row(&self, group: LayerId) -> Option<usize> {
        self.object_groups.iter().position(|g| *g == group)
    }

    fn is_tracked(&self, group: LayerId) -> bool {
        self.groups.contains_key(&group)
    }
}

pub struct MapObjectModel<'a> {
    doc: &'a MapDocument,
}

impl<'a> MapObjectModel<'a> {
    pub(crate) fn new(doc: &'a MapDocument) -> Self {
        Self { doc }
    }

    pub fn row_count(&self, parent: Option<&ObjectModelIndex>) -> usize {
        match parent {
            None => self.doc.object_rows.object_groups.len(),
            Some(index) => self.to_object_group(index).map_or(0, ObjectGroup::object_count),
        }
    }

    pub fn column_count(&self) -> usize {
        2
    }

    /// Returns `None` for rows past the end and for objects without a row
    /// handle, e.g. objects that are being created and aren't part of a
    /// tracked group yet.
    pub fn index(&self, row: usize, column: usize, parent: Option<&ObjectModelIndex>) -> Option<ObjectModelIndex> {
        if column >= self.column_count() {
            return None;
        }
        let rows = &self.doc.object_rows;
        match parent {
            None => {
                let group = rows.object_groups.get(row)?;
                Some(ModelIndex::new(row, column, *rows.groups.get(group)?))
            }
            Some(parent) => {
                let object = self.to_object_group(parent)?.object_at(row)?;
                let handle = rows.objects.get(&object.id())?;
                Some(ModelIndex::new(row, column, *handle))
            }
        }
    }

    pub fn parent(&self, index: &ObjectModelIndex) -> Option<ObjectModelIndex> {
        match self.doc.object_rows.entry(index.internal)? {
            RowEntry::Group(_) => None,
            RowEntry::Object(object) => self.group_index(self.doc.map.object_group_of(object)?),
        }
    }

    pub fn group_index(&self, group: LayerId) -> Option<ObjectModelIndex> {
        let rows = &self.doc.object_rows;
        let row = rows.group_row(group)?;
        Some(ModelIndex::new(row, 0, *rows.groups.get(&group)?))
    }

    pub fn object_index(&self, object: ObjectId, column: usize) -> Option<ObjectModelIndex> {
        let handle = self.doc.object_rows.objects.get(&object)?;
        let row = self.doc.map.object_index(object)?;
        Some(ModelIndex::new(row, column, *handle))
    }

    /// The object group of a group row.
    pub fn to_object_group(&self, index: &ObjectModelIndex) -> Option<&'a ObjectGroup> {
        self.to_layer(index)?.as_object_group()
    }

    pub fn to_layer(&self, index: &ObjectModelIndex) -> Option<&'a Layer> {
        match self.doc.object_rows.entry(index.internal)? {
            RowEntry::Group(group) => self.doc.map.layer(group),
            RowEntry::Object(_) => None,
        }
    }

    pub fn to_map_object(&self, index: &ObjectModelIndex) -> Option<&'a MapObject> {
        match self.doc.object_rows.entry(index.internal)? {
            RowEntry::Object(object) => self.doc.map.object(object),
            RowEntry::Group(_) => None,
        }
    }

    pub fn data(&self, index: &ObjectModelIndex, role: ItemDataRole) -> Option<ItemData> {
        if let Some(object) = self.to_map_object(index) {
            return match role {
                ItemDataRole::Display | ItemDataRole::Edit => {
                    let text = if index.column == 0 { &object.name } else { &object.object_type };
                    Some(ItemData::Text(text.clone()))
                }
                ItemDataRole::CheckState if index.column == 0 => Some(ItemData::CheckState(CheckState::from_bool(object.visible))),
                // objects have no opacity of their own
                ItemDataRole::Opacity => Some(ItemData::Number(1.0)),
                ItemDataRole::CheckState | ItemDataRole::Decoration => None,
            };
        }

        let layer = self.to_layer(index)?;
        match role {
            ItemDataRole::Display | ItemDataRole::Edit if index.column == 0 => Some(ItemData::Text(layer.name().to_string())),
            ItemDataRole::Decoration if index.column == 0 => Some(ItemData::Icon(LayerIcon::from(layer.layer_type()))),
            ItemDataRole::CheckState if index.column == 0 => Some(ItemData::CheckState(CheckState::from_bool(layer.is_visible()))),
            ItemDataRole::Opacity => Some(ItemData::Number(f64::from(layer.opacity()))),
            _ => None,
        }
    }

    pub fn flags(&self, index: &ObjectModelIndex) -> ItemFlags {
        let Some(entry) = self.doc.object_rows.entry(index.internal) else {
            return ItemFlags::empty();
        };
        let mut flags = ItemFlags::SELECTABLE | ItemFlags::ENABLED;
        if index.column == 0 {
            flags |= ItemFlags::USER_CHECKABLE | ItemFlags::EDITABLE;
        } else if matches!(entry, RowEntry::Object(_)) {
            // the type column
            flags |= ItemFlags::EDITABLE;
        }
        flags
    }

    pub fn header_data(&self, section: usize) -> Option<String> {
        match section {
            0 => Some(fl!(crate::LANGUAGE_LOADER, "header-name")),
            1 => Some(fl!(crate::LANGUAGE_LOADER, "header-type")),
            _ => None,
        }
    }
}

pub struct MapObjectModelMut<'a> {
    doc: &'a mut MapDocument,
}

impl<'a> MapObjectModelMut<'a> {
    pub(crate) fn new(doc: &'a mut MapDocument) -> Self {
        Self { doc }
    }

    pub fn as_model(&self) -> MapObjectModel<'_> {
        MapObjectModel::new(self.doc)
    }

    /// Inserts `object` into `group` at `index`, appending when `index` is
    /// `None`. Returns the row the object ended up at.
    pub fn insert_object(&mut self, group: LayerId, index: Option<usize>, object: MapObject) -> Result<usize> {
        let len = self.doc.map.object_group(group)?.object_count();
        let row = index.unwrap_or(len);
        if row > len {
            return Err(MapError::IndexOutOfRange { index: row, len }.into());
        }
        if self.doc.map.object_group_of(object.id()).is_some() {
            return Err(MapError::ObjectAlreadyInMap(object.id()).into());
        }

        let id = object.id();
        let tracked = self.doc.object_rows.is_tracked(group);
        if tracked {
            self.doc.emit(DocumentEvent::ObjectModel(ModelChange::RowsAboutToBeInserted {
                parent: Some(group),
                first: row,
                last: row,
            }));
        }
        self.doc.map.insert_object(group, row, object)?;
        if tracked {
            self.doc.object_rows.insert_object(id);
            self.doc.emit(DocumentEvent::ObjectModel(ModelChange::RowsInserted {
                parent: Some(group),
                first: row,
                last: row,
            }));
        }

        self.doc.emit(DocumentEvent::ObjectsInserted { group, first: row, last: row });
        if row < len {
            self.doc.emit(DocumentEvent::ObjectsIndexChanged {
                group,
                first: row + 1,
                last: len,
            });
        }
        self.doc.emit(DocumentEvent::ObjectsAdded { objects: vec![id] });
        Ok(row)
    }

    /// Takes `object` out of its group. Returns the row it was at together
    /// with the object, so it can be inserted there again.
    ///
    /// The object leaves the selection before its row is removed.
    pub fn remove_object(&mut self, object: ObjectId) -> Result<(usize, MapObject)> {
        let group = self.doc.map.object_group_of(object).ok_or(MapError::UnknownObject(object))?;
        let row = self.doc.map.object_index(object).ok_or(MapError::UnknownObject(object))?;

        self.doc.deselect_objects(&[object]);

        let tracked = self.doc.object_rows.is_tracked(group);
        if tracked {
            self.doc.emit(DocumentEvent::ObjectModel(ModelChange::RowsAboutToBeRemoved {
                parent: Some(group),
                first: row,
                last: row,
            }));
        }
        let removed = self.doc.map.remove_object_at(group, row)?;
        if tracked {
            self.doc.object_rows.remove_object(object);
            self.doc.emit(DocumentEvent::ObjectModel(ModelChange::RowsRemoved {
                parent: Some(group),
                first: row,
                last: row,
            }));
        }

        let len = self.doc.map.object_group(group)?.object_count();
        if row < len {
            self.doc.emit(DocumentEvent::ObjectsIndexChanged {
                group,
                first: row,
                last: len - 1,
            });
        }
        self.doc.emit(DocumentEvent::ObjectsRemoved { objects: vec![object] });
        Ok((row, removed))
    }

    /// Moves `count` objects starting at `from` in front of the object at
    /// `to`, `to` being a row from before the move.
    pub fn move_objects(&mut self, group: LayerId, from: usize, to: usize, count: usize) -> Result<()> {
        let len = self.doc.map.object_group(group)?.object_count();
        if !is_valid_move(len, from, to, count) {
            return Err(MapError::InvalidMove { from, to, count }.into());
        }

        let tracked = self.doc.object_rows.is_tracked(group);
        let last = from + count - 1;
        if tracked {
            self.doc.emit(DocumentEvent::ObjectModel(ModelChange::RowsAboutToBeMoved {
                parent: Some(group),
                first: from,
                last,
                destination: to,
            }));
        }
        self.doc.map.move_objects(group, from, to, count)?;
        if tracked {
            self.doc.emit(DocumentEvent::ObjectModel(ModelChange::RowsMoved {
                parent: Some(group),
                first: from,
                last,
                destination: to,
            }));
        }

        self.doc.emit(DocumentEvent::ObjectsIndexChanged {
            group,
            first: from.min(to),
            last: (from + count).max(to) - 1,
        });
        Ok(())
    }

    pub fn set_object_name(&mut self, object: ObjectId, name: &str) -> Result<()> {
        let o = self.object_mut(object)?;
        if o.name == name {
            return Ok(());
        }
        o.name = name.to_string();
        self.emit_cell_changed(object, 0);
        self.doc.emit(DocumentEvent::ObjectsChanged { objects: vec![object] });
        Ok(())
    }

    pub fn set_object_type(&mut self, object: ObjectId, object_type: &str) -> Result<()> {
        let o = self.object_mut(object)?;
        if o.object_type == object_type {
            return Ok(());
        }
        o.object_type = object_type.to_string();
        self.emit_cell_changed(object, 1);
        self.doc.emit(DocumentEvent::ObjectsChanged { objects: vec![object] });
        self.doc.emit(DocumentEvent::ObjectsTypeChanged { objects: vec![object] });
        Ok(())
    }

    pub fn set_object_visible(&mut self, object: ObjectId, visible: bool) -> Result<()> {
        let o = self.object_mut(object)?;
        if o.visible == visible {
            return Ok(());
        }
        o.visible = visible;
        self.emit_cell_changed(object, 0);
        self.doc.emit(DocumentEvent::ObjectsChanged { objects: vec![object] });
        Ok(())
    }

    pub fn set_object_position(&mut self, object: ObjectId, position: PointF) -> Result<()> {
        let o = self.object_mut(object)?;
        if o.position == position {
            return Ok(());
        }
        o.position = position;
        self.doc.emit(DocumentEvent::ObjectsChanged { objects: vec![object] });
        Ok(())
    }

    pub fn set_object_size(&mut self, object: ObjectId, size: SizeF) -> Result<()> {
        let o = self.object_mut(object)?;
        if o.size == size {
            return Ok(());
        }
        o.size = size;
        self.doc.emit(DocumentEvent::ObjectsChanged { objects: vec![object] });
        Ok(())
    }

    pub fn set_object_rotation(&mut self, object: ObjectId, rotation: f64) -> Result<()> {
        let o = self.object_mut(object)?;
        if o.rotation == rotation {
            return Ok(());
        }
        o.rotation = rotation;
        self.doc.emit(DocumentEvent::ObjectsChanged { objects: vec![object] });
        Ok(())
    }

    pub fn set_object_polygon(&mut self, object: ObjectId, polygon: &Polygon) -> Result<()> {
        let o = self.object_mut(object)?;
        if o.polygon == *polygon {
            return Ok(());
        }
        o.polygon = polygon.clone();
        self.doc.emit(DocumentEvent::ObjectsChanged { objects: vec![object] });
        Ok(())
    }

    /// Edits from a view. Object names and types each get their own undo
    /// macro; visibility of a group row goes through the layer model.
    ///
    /// Returns `Ok(false)` for edits the cell doesn't support.
    pub fn set_data(&mut self, index: &ObjectModelIndex, role: ItemDataRole, value: &ItemData) -> Result<bool> {
        let Some(entry) = self.doc.object_rows.entry(index.internal) else {
            return Ok(false);
        };

        match entry {
            RowEntry::Object(id) => {
                let object = self.doc.map.object(id).ok_or(MapError::UnknownObject(id))?;
                match role {
                    ItemDataRole::CheckState if index.column == 0 => {
                        let visible = value.to_check_state() == CheckState::Checked;
                        if visible != object.visible {
                            let old = object.visible;
                            self.doc.push_undo_action(EditorUndoOp::SetMapObjectVisible {
                                object: id,
                                old,
                                new: visible,
                            })?;
                        }
                        Ok(true)
                    }
                    ItemDataRole::Edit if index.column == 0 => {
                        let name = value.to_text();
                        if name != object.name {
                            let op = EditorUndoOp::ChangeMapObject {
                                object: id,
                                old_name: object.name.clone(),
                                old_type: object.object_type.clone(),
                                new_name: name,
                                new_type: object.object_type.clone(),
                            };
                            let mut guard = self.doc.begin_atomic_undo(fl!(crate::LANGUAGE_LOADER, "undo-change_object_name"))?;
                            self.doc.push_undo_action(op)?;
                            guard.end();
                        }
                        Ok(true)
                    }
                    ItemDataRole::Edit if index.column == 1 => {
                        let object_type = value.to_text();
                        if object_type != object.object_type {
                            let op = EditorUndoOp::ChangeMapObject {
                                object: id,
                                old_name: object.name.clone(),
                                old_type: object.object_type.clone(),
                                new_name: object.name.clone(),
                                new_type: object_type,
                            };
                            let mut guard = self.doc.begin_atomic_undo(fl!(crate::LANGUAGE_LOADER, "undo-change_object_type"))?;
                            self.doc.push_undo_action(op)?;
                            guard.end();
                        }
                        Ok(true)
                    }
                    _ => Ok(false),
                }
            }
            RowEntry::Group(group) => match role {
                ItemDataRole::CheckState if index.column == 0 => {
                    let Some(layer_index) = self.doc.layer_model().index_of(group) else {
                        return Ok(false);
                    };
                    self.doc.layer_model_mut().set_data(&layer_index, role, value)
                }
                ItemDataRole::Edit if index.column == 0 => {
                    let layer = self.doc.map.layer(group).ok_or(MapError::UnknownLayer(group))?;
                    let name = value.to_text();
                    if name != layer.name() {
                        let old = layer.name().to_string();
                        self.doc.push_undo_action(EditorUndoOp::RenameLayer { layer: group, old, new: name })?;
                    }
                    Ok(true)
                }
                _ => Ok(false),
            },
        }
    }

    fn object_mut(&mut self, object: ObjectId) -> Result<&mut MapObject> {
        self.doc.map.object_mut(object).ok_or_else(|| MapError::UnknownObject(object).into())
    }

    fn emit_cell_changed(&mut self, object: ObjectId, column: usize) {
        let Some(group) = self.doc.map.object_group_of(object) else {
            return;
        };
        if !self.doc.object_rows.is_tracked(group) {
            return;
        }
        let Some(row) = self.doc.map.object_index(object) else {
            return;
        };
        self.doc.emit(DocumentEvent::ObjectModel(ModelChange::DataChanged {
            parent: Some(group),
            row,
            first_column: column,
            last_column: column,
        }));
    }
}

/// Keeps the object model rows in sync with the layer model.
impl MapDocument {
    pub(crate) fn object_rows_layer_added(&mut self, layer: LayerId) {
        let Some(l) = self.map.layer(layer) else {
            return;
        };
        if !l.is_object_group() || self.object_rows.is_tracked(layer) {
            return;
        }
        if !matches!(self.map.parent_of(layer), Ok(None)) {
            log::debug!("object group {layer} inside a group layer isn't shown in the object model");
            return;
        }

        // insert after the closest object group below the new one
        let top_level = self.map.top_level_layers();
        let position = top_level.iter().position(|t| t.id() == layer).unwrap_or(0);
        let row = top_level[..position]
            .iter()
            .rev()
            .find_map(|t| self.object_rows.group_row(t.id()))
            .map_or(0, |row| row + 1);

        self.emit(DocumentEvent::ObjectModel(ModelChange::RowsAboutToBeInserted {
            parent: None,
            first: row,
            last: row,
        }));
        if let Some(l) = self.map.layer(layer) {
            self.object_rows.insert_group(row, l);
        }
        self.emit(DocumentEvent::ObjectModel(ModelChange::RowsInserted {
            parent: None,
            first: row,
            last: row,
        }));
    }

    pub(crate) fn object_rows_layer_about_to_be_removed(&mut self, parent: Option<LayerId>, index: usize) {
        if parent.is_some() {
            log::debug!("ignoring removal of nested layer {index} of {parent:?} in the object model");
            return;
        }
        let Ok(layer) = self.map.layer_at(None, index) else {
            return;
        };
        let Some(row) = self.object_rows.group_row(layer.id()) else {
            return;
        };

        self.emit(DocumentEvent::ObjectModel(ModelChange::RowsAboutToBeRemoved {
            parent: None,
            first: row,
            last: row,
        }));
        if let Ok(layer) = self.map.layer_at(None, index) {
            self.object_rows.remove_group(layer);
        }
        self.emit(DocumentEvent::ObjectModel(ModelChange::RowsRemoved {
            parent: None,
            first: row,
            last: row,
        }));
    }

    pub(crate) fn object_rows_layer_changed(&mut self, layer: LayerId) {
        let Some(row) = self.object_rows.group_row(layer) else {
            return;
        };
        self.emit(DocumentEvent::ObjectModel(ModelChange::DataChanged {
            parent: None,
            row,
            first_column: 0,
            last_column: 0,
        }));
    }
}
