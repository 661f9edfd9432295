use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Size;

/// Tiles cut from one image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tileset {
    pub name: String,
    pub tile_size: Size,
    pub tile_count: u32,
    pub columns: u32,
    pub image_source: Option<String>,
}

/// Tilesets are shared between maps and undo operations. The map compares
/// them by identity, two equal tilesets loaded twice are different tilesets.
pub type SharedTileset = Arc<Tileset>;

impl Tileset {
    pub fn new(name: impl Into<String>, tile_size: impl Into<Size>) -> Self {
        Self {
            name: name.into(),
            tile_size: tile_size.into(),
            tile_count: 0,
            columns: 0,
            image_source: None,
        }
    }

    pub fn with_image(mut self, image_source: impl Into<String>, tile_count: u32, columns: u32) -> Self {
        self.image_source = Some(image_source.into());
        self.tile_count = tile_count;
        self.columns = columns;
        self
    }

    pub fn into_shared(self) -> SharedTileset {
        Arc::new(self)
    }
}
