use i18n_embed_fl::fl;

use crate::{DocumentEvent, Layer, LayerId, LayerType, MapError, PointF, Position, Rectangle, Result};

use super::{EditorUndoOp, LayerMoveDirection, MapDocument};

impl MapDocument {
    /// A detached layer with a fresh id, ready to be inserted through the
    /// layer model or an undo operation.
    pub fn create_layer(&mut self, layer_type: LayerType, name: impl Into<String>) -> Layer {
        self.map.create_layer(layer_type, name)
    }

    /// Adds a new, empty layer above the current layer and makes it current.
    ///
    /// The layer is named after its type and the number of layers of that
    /// type, e.g. "Tile Layer 3".
    pub fn add_layer(&mut self, layer_type: LayerType) -> Result<LayerId> {
        let number = self.map.layer_count_of_type(layer_type) + 1;
        let name = match layer_type {
            LayerType::TileLayer => fl!(crate::LANGUAGE_LOADER, "layer-tile_name", number = number),
            LayerType::ObjectGroup => fl!(crate::LANGUAGE_LOADER, "layer-object_name", number = number),
            LayerType::ImageLayer => fl!(crate::LANGUAGE_LOADER, "layer-image_name", number = number),
            LayerType::GroupLayer => fl!(crate::LANGUAGE_LOADER, "layer-group_name", number = number),
        };

        let (parent, index) = self.insertion_point();
        let layer = self.map.create_layer(layer_type, name);
        let id = layer.id();

        self.push_undo_action(EditorUndoOp::AddLayer {
            parent,
            index,
            layer: Some(layer),
            description: None,
            selection: None,
        })?;
        self.change_current_layer(Some(id));

        if self.options.request_new_layer_name {
            self.emit(DocumentEvent::EditLayerNameRequested);
        }
        Ok(id)
    }

    /// Copies the current layer and puts the copy right above it.
    ///
    /// Returns the id of the copy, `None` without a current layer.
    pub fn duplicate_layer(&mut self) -> Result<Option<LayerId>> {
        let Some(current) = self.current_layer.filter(|l| self.map.contains_layer(*l)) else {
            return Ok(None);
        };
        let parent = self.map.parent_of(current)?;
        let index = self.map.sibling_index(current)? + 1;

        let Some(source) = self.map.layer(current).cloned() else {
            return Ok(None);
        };
        let mut copy = self.map.clone_layer(&source);
        copy.properties.name = fl!(crate::LANGUAGE_LOADER, "layer-duplicate_name", name = source.name());
        let id = copy.id();

        self.push_undo_action(EditorUndoOp::AddLayer {
            parent,
            index,
            layer: Some(copy),
            description: Some(fl!(crate::LANGUAGE_LOADER, "undo-duplicate_layer")),
            selection: None,
        })?;
        self.change_current_layer(Some(id));
        Ok(Some(id))
    }

    /// Merges the current layer onto the layer below it. Returns `false` when
    /// there is no layer below or the two can't be merged.
    pub fn merge_layer_down(&mut self) -> Result<bool> {
        let upper = self.get_current_layer()?;
        let parent = self.map.parent_of(upper)?;
        let index = self.map.sibling_index(upper)?;
        if index == 0 {
            return Ok(false);
        }

        let lower = self.map.layer_at(parent, index - 1)?;
        let Some(upper_layer) = self.map.layer(upper) else {
            return Ok(false);
        };
        if !lower.can_merge_with(upper_layer) {
            return Ok(false);
        }
        let lower = lower.id();

        let merged = self.map.merged_layer(lower, upper)?;
        let merged_id = merged.id();

        let mut guard = self.begin_atomic_undo(fl!(crate::LANGUAGE_LOADER, "undo-merge_layer_down"))?;
        let result = self.push_merge_operations(parent, index, merged);
        if let Err(err) = result {
            guard.discard_and_undo(self);
            return Err(err);
        }
        guard.end();

        self.change_current_layer(Some(merged_id));
        Ok(true)
    }

    fn push_merge_operations(&mut self, parent: Option<LayerId>, index: usize, merged: Layer) -> Result<()> {
        self.push_undo_action(EditorUndoOp::AddLayer {
            parent,
            index: index - 1,
            layer: Some(merged),
            description: None,
            selection: None,
        })?;
        // the merged layer pushed both originals one row up
        for _ in 0..2 {
            self.push_undo_action(EditorUndoOp::RemoveLayer {
                parent,
                index,
                layer: None,
                selection: None,
            })?;
        }
        Ok(())
    }

    /// Moves the layer one step up within its parent. Does nothing for the
    /// topmost layer.
    pub fn move_layer_up(&mut self, layer: LayerId) -> Result<()> {
        let parent = self.map.parent_of(layer)?;
        if self.map.sibling_index(layer)? + 1 >= self.map.child_count(parent)? {
            return Ok(());
        }
        self.push_undo_action(EditorUndoOp::MoveLayer {
            layer,
            direction: LayerMoveDirection::Up,
        })
    }

    pub fn move_layer_down(&mut self, layer: LayerId) -> Result<()> {
        if self.map.sibling_index(layer)? == 0 {
            return Ok(());
        }
        self.push_undo_action(EditorUndoOp::MoveLayer {
            layer,
            direction: LayerMoveDirection::Down,
        })
    }

    pub fn remove_layer(&mut self, layer: LayerId) -> Result<()> {
        let parent = self.map.parent_of(layer)?;
        let index = self.map.sibling_index(layer)?;
        self.push_undo_action(EditorUndoOp::RemoveLayer {
            parent,
            index,
            layer: None,
            selection: None,
        })
    }

    pub fn toggle_other_layers(&mut self, layer: LayerId) -> Result<()> {
        self.layer_model_mut().toggle_other_layers(layer)
    }

    /// Undoable offset change. Calls made while an undo macro is open, e.g.
    /// during a drag, end up as a single history entry.
    pub fn set_layer_offset(&mut self, layer: LayerId, offset: PointF) -> Result<()> {
        let old = self.map.layer(layer).ok_or(MapError::UnknownLayer(layer))?.offset();
        if old == offset {
            return Ok(());
        }
        self.push_undo_action(EditorUndoOp::SetLayerOffset { layer, old, new: offset })
    }

    /// Moves the content of `layers` by `offset` tiles inside `bounds`, each
    /// layer is swapped for a moved copy. Several layers form one "Offset Map"
    /// entry.
    pub fn offset_map(&mut self, layers: &[LayerId], offset: Position, bounds: Rectangle, wrap_x: bool, wrap_y: bool) -> Result<()> {
        let mut operations = Vec::with_capacity(layers.len());
        for layer in layers {
            let replacement = self.map.offset_layer(*layer, offset, bounds, wrap_x, wrap_y)?;
            operations.push(EditorUndoOp::OffsetLayer {
                layer: *layer,
                replacement: Some(replacement),
                selection: None,
            });
        }

        match operations.len() {
            0 => Ok(()),
            1 => self.push_undo_action(operations.remove(0)),
            _ => self.push_operations(fl!(crate::LANGUAGE_LOADER, "undo-offset_map"), operations),
        }
    }

    /// Where new layers go: right above the current layer, on top of the map
    /// without one.
    fn insertion_point(&self) -> (Option<LayerId>, usize) {
        if let Some(current) = self.current_layer {
            if let (Ok(parent), Ok(index)) = (self.map.parent_of(current), self.map.sibling_index(current)) {
                return (parent, index + 1);
            }
        }
        (None, self.map.top_level_layers().len())
    }
}
