//! Tree model over the layer forest of a map.
//!
//! [`LayerModel`] answers the read side of a tree view. All structural layer
//! changes go through [`LayerModelMut`], which brackets each map mutation
//! with the row notifications views rely on.

use i18n_embed_fl::fl;

use crate::{
    CheckState, DocumentEvent, ItemData, ItemDataRole, ItemFlags, Layer, LayerIcon, LayerId, LayerModelIndex, MapError, ModelChange, ModelIndex, PointF,
    Result,
};

use super::{EditorUndoOp, MapDocument};

pub struct LayerModel<'a> {
    doc: &'a MapDocument,
}

impl<'a> LayerModel<'a> {
    pub(crate) fn new(doc: &'a MapDocument) -> Self {
        Self { doc }
    }

    /// Number of direct children: top level layers for `None`, the child
    /// count of a group layer, 0 for any other layer.
    pub fn row_count(&self, parent: Option<&LayerModelIndex>) -> usize {
        match parent {
            None => self.doc.map.top_level_layers().len(),
            Some(index) => self.to_layer(index).map_or(0, Layer::child_count),
        }
    }

    pub fn column_count(&self) -> usize {
        1
    }

    pub fn index(&self, row: usize, column: usize, parent: Option<&LayerModelIndex>) -> Option<LayerModelIndex> {
        if column >= self.column_count() {
            return None;
        }
        match parent {
            None => (row < self.doc.map.top_level_layers().len()).then(|| ModelIndex::new(row, column, None)),
            Some(parent) => {
                let group = self.to_layer(parent)?;
                (row < group.as_group_layer()?.layer_count()).then(|| ModelIndex::new(row, column, Some(group.id())))
            }
        }
    }

    pub fn parent(&self, index: &LayerModelIndex) -> Option<LayerModelIndex> {
        self.index_of(index.internal?)
    }

    /// Index of the given layer, `None` if it isn't part of the map.
    pub fn index_of(&self, layer: LayerId) -> Option<LayerModelIndex> {
        let parent = self.doc.map.parent_of(layer).ok()?;
        let row = self.doc.map.sibling_index(layer).ok()?;
        Some(ModelIndex::new(row, 0, parent))
    }

    pub fn to_layer(&self, index: &LayerModelIndex) -> Option<&'a Layer> {
        self.doc.map.layer_at(index.internal, index.row).ok()
    }

    pub fn data(&self, index: &LayerModelIndex, role: ItemDataRole) -> Option<ItemData> {
        let layer = self.to_layer(index)?;
        match role {
            ItemDataRole::Display | ItemDataRole::Edit => Some(ItemData::Text(layer.name().to_string())),
            ItemDataRole::Decoration => Some(ItemData::Icon(LayerIcon::from(layer.layer_type()))),
            ItemDataRole::CheckState => Some(ItemData::CheckState(CheckState::from_bool(layer.is_visible()))),
            ItemDataRole::Opacity => Some(ItemData::Number(f64::from(layer.opacity()))),
        }
    }

    /// Makes sure the items are checkable and names editable.
    pub fn flags(&self, index: &LayerModelIndex) -> ItemFlags {
        if self.to_layer(index).is_none() {
            return ItemFlags::empty();
        }
        let mut flags = ItemFlags::SELECTABLE | ItemFlags::ENABLED;
        if index.column == 0 {
            flags |= ItemFlags::USER_CHECKABLE | ItemFlags::EDITABLE;
        }
        flags
    }

    pub fn header_data(&self, section: usize) -> Option<String> {
        match section {
            0 => Some(fl!(crate::LANGUAGE_LOADER, "header-layer")),
            _ => None,
        }
    }
}

pub struct LayerModelMut<'a> {
    doc: &'a mut MapDocument,
}

impl<'a> LayerModelMut<'a> {
    pub(crate) fn new(doc: &'a mut MapDocument) -> Self {
        Self { doc }
    }

    pub fn as_model(&self) -> LayerModel<'_> {
        LayerModel::new(self.doc)
    }

    /// Inserts `layer` as child `index` of `parent` (`None` = top level).
    ///
    /// The index has to be in `0..=child_count`, the layer must not be part
    /// of the map already.
    pub fn insert_layer(&mut self, parent: Option<LayerId>, index: usize, layer: Layer) -> Result<()> {
        let len = self.doc.map.child_count(parent)?;
        if index > len {
            return Err(MapError::IndexOutOfRange { index, len }.into());
        }
        self.doc.map.ensure_detached(&layer)?;

        let id = layer.id();
        self.doc.emit(DocumentEvent::LayerModel(ModelChange::RowsAboutToBeInserted {
            parent,
            first: index,
            last: index,
        }));
        self.doc.map.insert_layer(parent, index, layer)?;
        self.doc.emit(DocumentEvent::LayerModel(ModelChange::RowsInserted {
            parent,
            first: index,
            last: index,
        }));

        self.doc.emit(DocumentEvent::LayerAdded { layer: id });
        self.doc.object_rows_layer_added(id);

        // Select the first layer that gets added to the map
        let top_level = self.doc.map.top_level_layers();
        if self.doc.options.select_first_added_layer && top_level.len() == 1 && top_level[0].id() == id {
            self.doc.change_current_layer(Some(id));
        }
        Ok(())
    }

    /// Removes the layer at `index` of `parent` and hands it to the caller.
    ///
    /// Selection state referring to the layer is purged before the rows are
    /// removed.
    pub fn take_layer_at(&mut self, parent: Option<LayerId>, index: usize) -> Result<Layer> {
        let id = self.doc.map.layer_at(parent, index)?.id();

        self.doc.purge_selection_for_layer(parent, index)?;
        self.doc.emit(DocumentEvent::LayerAboutToBeRemoved { parent, index });
        self.doc.object_rows_layer_about_to_be_removed(parent, index);

        self.doc.emit(DocumentEvent::LayerModel(ModelChange::RowsAboutToBeRemoved {
            parent,
            first: index,
            last: index,
        }));
        let layer = self.doc.map.take_layer_at(parent, index)?;
        self.doc.emit(DocumentEvent::LayerModel(ModelChange::RowsRemoved {
            parent,
            first: index,
            last: index,
        }));

        self.doc.emit(DocumentEvent::LayerRemoved { layer: id });
        Ok(layer)
    }

    /// Puts `replacement` where `layer` is and returns the replaced layer.
    /// The current layer follows the replacement.
    pub fn replace_layer(&mut self, layer: LayerId, replacement: Layer) -> Result<Layer> {
        self.doc.map.ensure_detached(&replacement)?;

        let current_layer = self.doc.current_layer;
        let parent = self.doc.map.parent_of(layer)?;
        let index = self.doc.map.sibling_index(layer)?;
        let replacement_id = replacement.id();

        let replaced = self.take_layer_at(parent, index)?;
        self.insert_layer(parent, index, replacement)?;

        if current_layer == Some(layer) {
            self.doc.change_current_layer(Some(replacement_id));
        }
        Ok(replaced)
    }

    pub fn set_layer_visible(&mut self, layer: LayerId, visible: bool) -> Result<()> {
        let l = self.layer_mut(layer)?;
        if l.properties.is_visible == visible {
            return Ok(());
        }
        l.properties.is_visible = visible;
        self.emit_layer_changed(layer)
    }

    pub fn set_layer_opacity(&mut self, layer: LayerId, opacity: f32) -> Result<()> {
        let l = self.layer_mut(layer)?;
        if l.properties.opacity == opacity {
            return Ok(());
        }
        l.properties.opacity = opacity;
        self.emit_layer_changed(layer)
    }

    pub fn set_layer_offset(&mut self, layer: LayerId, offset: PointF) -> Result<()> {
        let l = self.layer_mut(layer)?;
        if l.properties.offset == offset {
            return Ok(());
        }
        l.properties.offset = offset;
        self.emit_layer_changed(layer)
    }

    pub fn rename_layer(&mut self, layer: LayerId, name: &str) -> Result<()> {
        let l = self.layer_mut(layer)?;
        if l.properties.name == name {
            return Ok(());
        }
        l.properties.name = name.to_string();
        self.emit_layer_changed(layer)
    }

    /// Show or hide all siblings of `layer`. If any other sibling is visible
    /// all of them get hidden, otherwise they are all shown. Pushes one undo
    /// macro, nothing when the layer has no siblings.
    pub fn toggle_other_layers(&mut self, layer: LayerId) -> Result<()> {
        let parent = self.doc.map.parent_of(layer)?;
        let siblings = self.doc.map.children(parent)?;
        if siblings.len() <= 1 {
            return Ok(());
        }

        let visibility = !siblings.iter().any(|l| l.id() != layer && l.is_visible());
        let targets: Vec<LayerId> = siblings
            .iter()
            .filter(|l| l.id() != layer && l.is_visible() != visibility)
            .map(Layer::id)
            .collect();

        let description = if visibility {
            fl!(crate::LANGUAGE_LOADER, "undo-show_other_layers")
        } else {
            fl!(crate::LANGUAGE_LOADER, "undo-hide_other_layers")
        };
        let operations = targets
            .into_iter()
            .map(|target| EditorUndoOp::SetLayerVisible {
                layer: target,
                old: !visibility,
                new: visibility,
            })
            .collect();
        self.doc.push_operations(description, operations)
    }

    /// Edits from a view. Visibility, opacity and name changes become undo
    /// entries; a value equal to the current one changes nothing.
    ///
    /// Returns `Ok(false)` when the edit was rejected, e.g. an opacity that
    /// isn't a number.
    pub fn set_data(&mut self, index: &LayerModelIndex, role: ItemDataRole, value: &ItemData) -> Result<bool> {
        let Some(layer) = self.as_model().to_layer(index) else {
            return Ok(false);
        };
        let id = layer.id();

        match role {
            ItemDataRole::CheckState => {
                let visible = value.to_check_state() == CheckState::Checked;
                if visible != layer.is_visible() {
                    let old = layer.is_visible();
                    self.doc.push_undo_action(EditorUndoOp::SetLayerVisible { layer: id, old, new: visible })?;
                }
                Ok(true)
            }
            ItemDataRole::Opacity => {
                let Some(opacity) = value.to_f64().filter(|o| o.is_finite()) else {
                    return Ok(false);
                };
                let opacity = opacity.clamp(0.0, 1.0) as f32;
                if layer.opacity() != opacity {
                    let old = layer.opacity();
                    self.doc.push_undo_action(EditorUndoOp::SetLayerOpacity { layer: id, old, new: opacity })?;
                }
                Ok(true)
            }
            ItemDataRole::Edit => {
                let name = value.to_text();
                if layer.name() != name {
                    let old = layer.name().to_string();
                    self.doc.push_undo_action(EditorUndoOp::RenameLayer { layer: id, old, new: name })?;
                }
                Ok(true)
            }
            ItemDataRole::Display | ItemDataRole::Decoration => Ok(false),
        }
    }

    fn layer_mut(&mut self, layer: LayerId) -> Result<&mut Layer> {
        self.doc.map.layer_mut(layer).ok_or_else(|| MapError::UnknownLayer(layer).into())
    }

    fn emit_layer_changed(&mut self, layer: LayerId) -> Result<()> {
        let parent = self.doc.map.parent_of(layer)?;
        let row = self.doc.map.sibling_index(layer)?;
        self.doc.emit(DocumentEvent::LayerModel(ModelChange::DataChanged {
            parent,
            row,
            first_column: 0,
            last_column: 0,
        }));
        self.doc.emit(DocumentEvent::LayerChanged { layer });
        self.doc.object_rows_layer_changed(layer);
        Ok(())
    }
}
