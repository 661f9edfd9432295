use thiserror::Error;

use crate::{LayerId, ObjectId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Unknown layer {0}")]
    UnknownLayer(LayerId),
    #[error("Layer {0} is not a group layer")]
    NotAGroupLayer(LayerId),
    #[error("Layer {0} is not an object group")]
    NotAnObjectGroup(LayerId),
    #[error("Unknown object {0}")]
    UnknownObject(ObjectId),
    #[error("Layer {0} already belongs to the map")]
    LayerAlreadyInMap(LayerId),
    #[error("Object {0} already belongs to the map")]
    ObjectAlreadyInMap(ObjectId),
    #[error("Tileset {0} already belongs to the map")]
    TilesetAlreadyInMap(String),
    #[error("Can't move {count} rows from {from} to {to}")]
    InvalidMove { from: usize, to: usize, count: usize },
}
