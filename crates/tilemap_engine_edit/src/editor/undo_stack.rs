use serde::{Deserialize, Serialize};

use crate::Result;

use super::EditorUndoOp;

pub trait UndoState {
    fn undo_description(&self) -> Option<String>;
    fn can_undo(&self) -> bool;
    /// Reverts the newest history entry and moves it to the redo side.
    ///
    /// # Errors
    ///
    /// This function will return an error if an undo macro is still open or
    /// the operation can't be reverted.
    fn undo(&mut self) -> Result<()>;

    fn redo_description(&self) -> Option<String>;
    fn can_redo(&self) -> bool;
    /// Re-applies the newest undone entry.
    ///
    /// # Errors
    ///
    /// This function will return an error if an undo macro is still open or
    /// the operation can't be applied.
    fn redo(&mut self) -> Result<()>;
}

/// Linear undo history.
///
/// Pushing a new entry drops everything on the redo side. With a limit set,
/// the oldest entries are evicted, but never while a macro is being
/// recorded since the macro guard addresses entries by position.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EditorUndoStack {
    undo: Vec<EditorUndoOp>,
    redo: Vec<EditorUndoOp>,
    #[serde(default)]
    limit: usize,
    #[serde(default)]
    clean_index: Option<usize>,
    #[serde(skip)]
    macro_open: bool,
}

impl EditorUndoStack {
    pub fn new() -> Self {
        Self {
            clean_index: Some(0),
            ..Default::default()
        }
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.undo.last().map(EditorUndoOp::get_description)
    }

    pub fn redo_description(&self) -> Option<String> {
        self.redo.last().map(EditorUndoOp::get_description)
    }

    pub fn undo_operations(&self) -> &[EditorUndoOp] {
        &self.undo
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// 0 = unlimited
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.enforce_limit();
    }

    /// Pushes a freshly applied operation, truncating the redo side.
    pub fn push(&mut self, op: EditorUndoOp) {
        self.clear_redo();
        self.push_undo(op);
        self.enforce_limit();
    }

    pub fn push_undo(&mut self, op: EditorUndoOp) {
        self.undo.push(op);
    }

    pub fn pop_undo(&mut self) -> Option<EditorUndoOp> {
        self.undo.pop()
    }

    pub fn push_redo(&mut self, op: EditorUndoOp) {
        self.redo.push(op);
    }

    pub fn pop_redo(&mut self) -> Option<EditorUndoOp> {
        self.redo.pop()
    }

    pub fn clear_redo(&mut self) {
        if self.redo.is_empty() {
            return;
        }
        self.redo.clear();
        // the clean state was on the discarded branch
        if self.clean_index.is_some_and(|i| i > self.undo.len()) {
            self.clean_index = None;
        }
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.clean_index = Some(0);
    }

    pub(crate) fn enforce_limit(&mut self) {
        if self.limit == 0 || self.macro_open {
            return;
        }
        while self.undo.len() > self.limit {
            self.undo.remove(0);
            self.clean_index = self.clean_index.and_then(|i| i.checked_sub(1));
        }
    }

    pub fn mark_clean(&mut self) {
        self.clean_index = Some(self.undo.len());
    }

    pub fn is_clean(&self) -> bool {
        self.clean_index == Some(self.undo.len())
    }

    pub fn is_macro_open(&self) -> bool {
        self.macro_open
    }

    pub(crate) fn set_macro_open(&mut self, open: bool) {
        self.macro_open = open;
    }
}
