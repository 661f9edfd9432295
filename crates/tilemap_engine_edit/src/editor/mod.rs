pub mod undo_stack;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

pub use undo_stack::*;

pub mod undo_operation;
pub use undo_operation::{EditorUndoOp, LayerMoveDirection};

mod editor_error;
pub use editor_error::*;

mod layer_model;
pub use layer_model::*;

mod object_model;
pub use object_model::*;

mod layer_operations;
mod object_operations;
pub use object_operations::RotateDirection;
mod selection_operations;
pub use selection_operations::*;
mod tileset_operations;

use i18n_embed_fl::fl;
use parking_lot::Mutex;

use crate::{DocumentEvent, DocumentObserver, EditorOptions, LayerId, Map, ObjectId, ObserverId, Region, Result, events::Notifier};

/// An open map: owns the map, its undo history and the selection state, and
/// is the only way to mutate any of them.
///
/// The layer and object tree models are views onto the document, obtained
/// with [`MapDocument::layer_model`] / [`MapDocument::object_model`] and their
/// `_mut` counterparts.
pub struct MapDocument {
    map: Map,
    file_name: Option<PathBuf>,

    /// Undo history, shared with open [`AtomicUndoGuard`]s
    undo_stack: Arc<Mutex<EditorUndoStack>>,

    /// Row identity table of the object model
    object_rows: ObjectRowTable,

    current_layer: Option<LayerId>,
    current_object: Option<CurrentObject>,
    selected_area: Region,
    selected_objects: Vec<ObjectId>,

    notifier: Notifier,
    options: EditorOptions,
}

/// Guard for atomic undo operations
/// When dropped, collects all operations pushed since creation into an Atomic operation
pub struct AtomicUndoGuard {
    base_count: usize,
    description: String,
    undo_stack: Arc<Mutex<EditorUndoStack>>,
    ended: bool,
}

impl AtomicUndoGuard {
    fn new(description: String, undo_stack: Arc<Mutex<EditorUndoStack>>) -> Result<Self> {
        let base_count = {
            let mut stack = undo_stack.lock();
            if stack.is_macro_open() {
                return Err(EditorError::MacroAlreadyOpen.into());
            }
            stack.set_macro_open(true);
            stack.clear_redo();
            stack.undo_len()
        };
        Ok(Self {
            base_count,
            description,
            undo_stack,
            ended: false,
        })
    }

    pub fn end(&mut self) {
        self.end_action();
    }

    /// Drops all operations pushed since the guard was created and reverts
    /// their effect on the document.
    pub fn discard_and_undo(&mut self, document: &mut MapDocument) {
        if self.ended {
            return;
        }

        let mut stack = self.undo_stack.lock();
        while stack.undo_len() > self.base_count {
            if let Some(mut op) = stack.pop_undo() {
                // Need to drop the lock before calling undo to avoid deadlock
                drop(stack);
                if let Err(e) = op.undo(document) {
                    log::warn!("Failed to undo operation during discard: {e}");
                }
                stack = self.undo_stack.lock();
            }
        }
        stack.set_macro_open(false);
        self.ended = true;
    }

    fn end_action(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        let mut stack = self.undo_stack.lock();
        stack.set_macro_open(false);

        let mut operations = Vec::new();
        while stack.undo_len() > self.base_count {
            if let Some(op) = stack.pop_undo() {
                operations.push(op);
            }
        }
        operations.reverse();

        let operations = coalesce_atomic_operations(operations);
        if operations.is_empty() {
            return;
        }

        stack.push_undo(EditorUndoOp::Atomic {
            description: self.description.clone(),
            operations,
        });
        stack.enforce_limit();
    }
}

/// Merges drag updates: consecutive offset or position changes of the same
/// layer / object collapse into one operation keeping the first old and the
/// last new value.
fn coalesce_atomic_operations(operations: Vec<EditorUndoOp>) -> Vec<EditorUndoOp> {
    let mut out: Vec<EditorUndoOp> = Vec::with_capacity(operations.len());
    let mut iter = operations.into_iter().peekable();

    while let Some(op) = iter.next() {
        match op {
            EditorUndoOp::SetLayerOffset { layer, old, new } => {
                let mut last_new = new;
                while let Some(EditorUndoOp::SetLayerOffset {
                    layer: next_layer, new: next_new, ..
                }) = iter.peek()
                {
                    if *next_layer != layer {
                        break;
                    }
                    last_new = *next_new;
                    iter.next();
                }
                out.push(EditorUndoOp::SetLayerOffset { layer, old, new: last_new });
            }
            EditorUndoOp::MoveMapObject { object, old, new } => {
                let mut last_new = new;
                while let Some(EditorUndoOp::MoveMapObject {
                    object: next_object, new: next_new, ..
                }) = iter.peek()
                {
                    if *next_object != object {
                        break;
                    }
                    last_new = *next_new;
                    iter.next();
                }
                out.push(EditorUndoOp::MoveMapObject { object, old, new: last_new });
            }
            other => out.push(other),
        }
    }

    out
}

impl Drop for AtomicUndoGuard {
    fn drop(&mut self) {
        self.end_action();
    }
}

impl MapDocument {
    pub fn new(map: Map) -> Self {
        Self::with_options(map, EditorOptions::default())
    }

    pub fn with_options(map: Map, options: EditorOptions) -> Self {
        let mut undo_stack = EditorUndoStack::new();
        undo_stack.set_limit(options.undo_limit);
        let object_rows = ObjectRowTable::from_map(&map);
        let current_layer = map.top_level_layers().first().map(tilemap_engine::Layer::id);

        Self {
            map,
            file_name: None,
            undo_stack: Arc::new(Mutex::new(undo_stack)),
            object_rows,
            current_layer,
            current_object: Some(CurrentObject::Map),
            selected_area: Region::new(),
            selected_objects: Vec::new(),
            notifier: Notifier::default(),
            options,
        }
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn file_name(&self) -> Option<&Path> {
        self.file_name.as_deref()
    }

    pub fn set_file_name(&mut self, file_name: impl Into<PathBuf>) {
        self.file_name = Some(file_name.into());
    }

    /// File name without its path, "untitled.tmx" for new maps.
    pub fn display_name(&self) -> String {
        self.file_name
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| fl!(crate::LANGUAGE_LOADER, "document-untitled"))
    }

    pub fn subscribe(&mut self, observer: impl DocumentObserver + 'static) -> ObserverId {
        self.notifier.subscribe(Box::new(observer))
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.notifier.unsubscribe(id)
    }

    pub(crate) fn emit(&mut self, event: DocumentEvent) {
        self.notifier.emit(&event);
    }

    pub fn layer_model(&self) -> LayerModel<'_> {
        LayerModel::new(self)
    }

    pub fn layer_model_mut(&mut self) -> LayerModelMut<'_> {
        LayerModelMut::new(self)
    }

    pub fn object_model(&self) -> MapObjectModel<'_> {
        MapObjectModel::new(self)
    }

    pub fn object_model_mut(&mut self) -> MapObjectModelMut<'_> {
        MapObjectModelMut::new(self)
    }

    /// Starts an undo macro. Everything pushed until the guard ends becomes a
    /// single history entry; only one macro can be open at a time.
    pub fn begin_atomic_undo(&mut self, description: impl Into<String>) -> Result<AtomicUndoGuard> {
        AtomicUndoGuard::new(description.into(), self.undo_stack.clone())
    }

    /// Push and execute an undo operation
    pub(crate) fn push_undo_action(&mut self, mut op: EditorUndoOp) -> Result<()> {
        op.redo(self)?;
        self.push_plain_undo(op)
    }

    /// Push an undo operation without executing it
    pub(crate) fn push_plain_undo(&mut self, op: EditorUndoOp) -> Result<()> {
        self.undo_stack.lock().push(op);
        Ok(())
    }

    /// Returns the undo stack len of this [`MapDocument`].
    pub fn undo_stack_len(&self) -> usize {
        self.undo_stack.lock().undo_len()
    }

    pub fn redo_stack_len(&self) -> usize {
        self.undo_stack.lock().redo_len()
    }

    pub fn get_undo_stack(&self) -> Arc<Mutex<EditorUndoStack>> {
        self.undo_stack.clone()
    }

    pub fn mark_clean(&mut self) {
        self.undo_stack.lock().mark_clean();
    }

    pub fn is_modified(&self) -> bool {
        !self.undo_stack.lock().is_clean()
    }
}

impl UndoState for MapDocument {
    fn undo_description(&self) -> Option<String> {
        self.undo_stack.lock().undo_description()
    }

    fn can_undo(&self) -> bool {
        self.undo_stack.lock().can_undo()
    }

    fn undo(&mut self) -> Result<()> {
        let op = {
            let mut stack = self.undo_stack.lock();
            if stack.is_macro_open() {
                return Err(EditorError::MacroInProgress.into());
            }
            stack.pop_undo()
        };
        let Some(mut op) = op else {
            return Ok(());
        };

        let res = op.undo(self);
        self.undo_stack.lock().push_redo(op);
        res
    }

    fn redo_description(&self) -> Option<String> {
        self.undo_stack.lock().redo_description()
    }

    fn can_redo(&self) -> bool {
        self.undo_stack.lock().can_redo()
    }

    fn redo(&mut self) -> Result<()> {
        let op = {
            let mut stack = self.undo_stack.lock();
            if stack.is_macro_open() {
                return Err(EditorError::MacroInProgress.into());
            }
            stack.pop_redo()
        };
        let Some(mut op) = op else {
            return Ok(());
        };

        let res = op.redo(self);
        self.undo_stack.lock().push_undo(op);
        res
    }
}
