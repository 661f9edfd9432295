//! Change notifications emitted by a [`crate::MapDocument`].
//!
//! Events are delivered synchronously, in emission order, to every subscribed
//! observer. Structural "about to" events always precede the mutation they
//! announce and the matching "done" event follows it directly; no other
//! mutation of the same model happens in between.

use crate::{CurrentObject, LayerId, ObjectId, Region};

/// Structural and cell-level changes of one of the tree models.
///
/// `parent` is the parent row's layer: a group layer in the layer model, an
/// object group in the object model. `None` addresses top level rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelChange {
    RowsAboutToBeInserted {
        parent: Option<LayerId>,
        first: usize,
        last: usize,
    },
    RowsInserted {
        parent: Option<LayerId>,
        first: usize,
        last: usize,
    },
    RowsAboutToBeRemoved {
        parent: Option<LayerId>,
        first: usize,
        last: usize,
    },
    RowsRemoved {
        parent: Option<LayerId>,
        first: usize,
        last: usize,
    },
    /// `destination` is the row in front of which the range ends up, in
    /// coordinates from before the move.
    RowsAboutToBeMoved {
        parent: Option<LayerId>,
        first: usize,
        last: usize,
        destination: usize,
    },
    RowsMoved {
        parent: Option<LayerId>,
        first: usize,
        last: usize,
        destination: usize,
    },
    DataChanged {
        parent: Option<LayerId>,
        row: usize,
        first_column: usize,
        last_column: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentEvent {
    LayerModel(ModelChange),
    ObjectModel(ModelChange),

    LayerAdded { layer: LayerId },
    /// Sent before the layer at `index` of `parent` is taken out of the map.
    LayerAboutToBeRemoved { parent: Option<LayerId>, index: usize },
    LayerRemoved { layer: LayerId },
    LayerChanged { layer: LayerId },
    EditLayerNameRequested,

    CurrentLayerChanged { layer: Option<LayerId> },
    CurrentObjectChanged { object: Option<CurrentObject> },
    SelectedAreaChanged { new: Region, old: Region },
    SelectedObjectsChanged,

    ObjectsAdded { objects: Vec<ObjectId> },
    ObjectsInserted { group: LayerId, first: usize, last: usize },
    ObjectsRemoved { objects: Vec<ObjectId> },
    ObjectsChanged { objects: Vec<ObjectId> },
    ObjectsTypeChanged { objects: Vec<ObjectId> },
    ObjectsIndexChanged { group: LayerId, first: usize, last: usize },

    TilesetAboutToBeAdded { index: usize },
    TilesetAdded { index: usize },
    TilesetAboutToBeRemoved { index: usize },
    TilesetRemoved { index: usize },
    TilesetReplaced { index: usize },
}

pub trait DocumentObserver: Send {
    fn on_event(&mut self, event: &DocumentEvent);
}

impl<F> DocumentObserver for F
where
    F: FnMut(&DocumentEvent) + Send,
{
    fn on_event(&mut self, event: &DocumentEvent) {
        self(event);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u32);

#[derive(Default)]
pub(crate) struct Notifier {
    observers: Vec<(ObserverId, Box<dyn DocumentObserver>)>,
    next_id: u32,
}

impl Notifier {
    pub fn subscribe(&mut self, observer: Box<dyn DocumentObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let len = self.observers.len();
        self.observers.retain(|(i, _)| *i != id);
        len != self.observers.len()
    }

    pub fn emit(&mut self, event: &DocumentEvent) {
        for (_, observer) in &mut self.observers {
            observer.on_event(event);
        }
    }
}
