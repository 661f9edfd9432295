use std::sync::Arc;

use i18n_embed_fl::fl;

use crate::{DocumentEvent, MapError, Result, SharedTileset};

use super::{EditorUndoOp, MapDocument};

impl MapDocument {
    /// Inserts `tileset` without an undo entry.
    pub fn insert_tileset(&mut self, index: usize, tileset: SharedTileset) -> Result<()> {
        self.check_tileset_insert(index, &tileset)?;
        self.emit(DocumentEvent::TilesetAboutToBeAdded { index });
        self.map.insert_tileset(index, tileset)?;
        self.emit(DocumentEvent::TilesetAdded { index });
        Ok(())
    }

    /// Removes the tileset at `index` without an undo entry. Tiles in the
    /// layers referring to it are left as they are.
    pub fn remove_tileset_at(&mut self, index: usize) -> Result<SharedTileset> {
        self.map.tileset_at(index)?;
        self.emit(DocumentEvent::TilesetAboutToBeRemoved { index });
        let tileset = self.map.remove_tileset_at(index)?;
        self.emit(DocumentEvent::TilesetRemoved { index });
        Ok(tileset)
    }

    /// Puts `tileset` at `index` without an undo entry and returns the old
    /// one. When `tileset` is already used by the map the old one is only
    /// removed.
    pub fn replace_tileset(&mut self, index: usize, tileset: SharedTileset) -> Result<SharedTileset> {
        let (old, added) = self.map.replace_tileset(index, tileset)?;
        if added {
            self.emit(DocumentEvent::TilesetReplaced { index });
        } else {
            self.emit(DocumentEvent::TilesetRemoved { index });
        }
        Ok(old)
    }

    /// Appends `tileset` and returns its index.
    pub fn add_tileset(&mut self, tileset: SharedTileset) -> Result<usize> {
        let index = self.map.tileset_count();
        self.check_tileset_insert(index, &tileset)?;
        self.push_undo_action(EditorUndoOp::AddTileset { index, tileset })?;
        Ok(index)
    }

    /// Appends several tilesets as one history entry.
    pub fn add_tilesets(&mut self, tilesets: Vec<SharedTileset>) -> Result<()> {
        let first = self.map.tileset_count();
        for (i, tileset) in tilesets.iter().enumerate() {
            let listed_twice = tilesets[..i].iter().any(|t| Arc::ptr_eq(t, tileset));
            if listed_twice || self.map.index_of_tileset(tileset).is_some() {
                return Err(MapError::TilesetAlreadyInMap(tileset.name.clone()).into());
            }
        }

        let count = tilesets.len();
        let mut operations: Vec<EditorUndoOp> = tilesets
            .into_iter()
            .enumerate()
            .map(|(i, tileset)| EditorUndoOp::AddTileset { index: first + i, tileset })
            .collect();
        match operations.len() {
            0 => Ok(()),
            1 => self.push_undo_action(operations.remove(0)),
            _ => self.push_operations(fl!(crate::LANGUAGE_LOADER, "undo-add_tilesets", count = count), operations),
        }
    }

    pub fn remove_tileset(&mut self, index: usize) -> Result<()> {
        self.map.tileset_at(index)?;
        self.push_undo_action(EditorUndoOp::RemoveTileset { index, tileset: None })
    }

    /// Undoable replacement of the tileset at `index`.
    pub fn change_tileset(&mut self, index: usize, tileset: SharedTileset) -> Result<()> {
        self.map.tileset_at(index)?;
        if self.map.index_of_tileset(&tileset).is_some() {
            return Err(MapError::TilesetAlreadyInMap(tileset.name.clone()).into());
        }
        self.push_undo_action(EditorUndoOp::ReplaceTileset { index, tileset })
    }

    fn check_tileset_insert(&self, index: usize, tileset: &SharedTileset) -> Result<()> {
        let len = self.map.tileset_count();
        if index > len {
            return Err(MapError::IndexOutOfRange { index, len }.into());
        }
        if self.map.index_of_tileset(tileset).is_some() {
            return Err(MapError::TilesetAlreadyInMap(tileset.name.clone()).into());
        }
        Ok(())
    }
}
