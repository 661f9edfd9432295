//! Vocabulary shared by the layer and object tree models: indices, roles,
//! cell values and item flags.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{LayerId, LayerType};

/// Address of a cell in one of the tree models.
///
/// `internal` is model specific: the layer model stores the parent group
/// (`None` for top level rows), the object model an opaque row handle.
/// An invalid index is represented as `None` wherever an index is expected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelIndex<T> {
    pub row: usize,
    pub column: usize,
    pub internal: T,
}

impl<T: Copy> ModelIndex<T> {
    pub fn new(row: usize, column: usize, internal: T) -> Self {
        Self { row, column, internal }
    }

    pub fn sibling_at_column(&self, column: usize) -> Self {
        Self { column, ..*self }
    }
}

pub type LayerModelIndex = ModelIndex<Option<LayerId>>;
pub type ObjectModelIndex = ModelIndex<RowHandle>;

/// Stable per-row token handed out by the object model.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowHandle(pub(crate) u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemDataRole {
    Display,
    Edit,
    Decoration,
    CheckState,
    /// Layer opacity, kept apart from the display text so editors can read
    /// and write it as a number.
    Opacity,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckState {
    #[default]
    Unchecked,
    PartiallyChecked,
    Checked,
}

impl CheckState {
    pub fn from_bool(checked: bool) -> Self {
        if checked { CheckState::Checked } else { CheckState::Unchecked }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LayerIcon {
    TileLayer,
    ObjectGroup,
    ImageLayer,
    GroupLayer,
}

impl From<LayerType> for LayerIcon {
    fn from(layer_type: LayerType) -> Self {
        match layer_type {
            LayerType::TileLayer => LayerIcon::TileLayer,
            LayerType::ObjectGroup => LayerIcon::ObjectGroup,
            LayerType::ImageLayer => LayerIcon::ImageLayer,
            LayerType::GroupLayer => LayerIcon::GroupLayer,
        }
    }
}

/// Value of a model cell for one role.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemData {
    Text(String),
    CheckState(CheckState),
    Icon(LayerIcon),
    Number(f64),
}

impl ItemData {
    /// Numeric value, `None` when the text doesn't parse as a number.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            ItemData::Number(n) => Some(*n),
            ItemData::Text(s) => s.trim().parse().ok(),
            ItemData::CheckState(_) | ItemData::Icon(_) => None,
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            ItemData::Text(s) => s.clone(),
            ItemData::Number(n) => n.to_string(),
            ItemData::CheckState(c) => (*c as i32).to_string(),
            ItemData::Icon(_) => String::new(),
        }
    }

    pub fn to_check_state(&self) -> CheckState {
        match self {
            ItemData::CheckState(c) => *c,
            _ => match self.to_f64().map(|n| n as i32) {
                Some(2) => CheckState::Checked,
                Some(1) => CheckState::PartiallyChecked,
                _ => CheckState::Unchecked,
            },
        }
    }
}

impl From<&str> for ItemData {
    fn from(value: &str) -> Self {
        ItemData::Text(value.to_string())
    }
}

impl From<String> for ItemData {
    fn from(value: String) -> Self {
        ItemData::Text(value)
    }
}

impl From<f64> for ItemData {
    fn from(value: f64) -> Self {
        ItemData::Number(value)
    }
}

impl From<CheckState> for ItemData {
    fn from(value: CheckState) -> Self {
        ItemData::CheckState(value)
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct ItemFlags: u32 {
        const SELECTABLE = 0b0001;
        const ENABLED = 0b0010;
        const EDITABLE = 0b0100;
        const USER_CHECKABLE = 0b1000;
    }
}
