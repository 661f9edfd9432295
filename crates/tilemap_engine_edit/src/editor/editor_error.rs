use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorError {
    #[error("Current layer is invalid")]
    CurrentLayerInvalid,
    #[error("An undo macro is already open")]
    MacroAlreadyOpen,
    #[error("Can't undo or redo while an undo macro is open")]
    MacroInProgress,
    #[error("Undo operation has no payload")]
    MissingUndoPayload,
}
