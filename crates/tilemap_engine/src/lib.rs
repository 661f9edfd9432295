#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::too_many_lines,
    clippy::cast_lossless,
    clippy::cast_precision_loss,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_errors_doc,
    clippy::float_cmp
)]
mod position;
pub use position::*;

mod geometry;
pub use geometry::*;

mod region;
pub use region::*;

mod layer;
pub use layer::*;

mod object_group;
pub use object_group::*;

mod map_object;
pub use map_object::*;

mod tileset;
pub use tileset::*;

mod map;
pub use map::*;

mod errors;
pub use errors::*;

pub type EngineResult<T> = anyhow::Result<T>;
pub type Result<T> = anyhow::Result<T>;

use serde::{Deserialize, Serialize};

/// Integer size, used for map and tile dimensions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(width: {}, height: {})", self.width, self.height)
    }
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

impl From<(i32, i32)> for Size {
    fn from((width, height): (i32, i32)) -> Self {
        Size { width, height }
    }
}

/// Tile rectangle, `start` inclusive and `start + size` exclusive.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    pub start: Position,
    pub size: Size,
}

impl std::fmt::Display for Rectangle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(x:{}, y:{}, width: {}, height: {})",
            self.start.x, self.start.y, self.size.width, self.size.height
        )
    }
}

impl Rectangle {
    pub fn new(start: Position, size: Size) -> Self {
        Self { start, size }
    }

    pub fn from(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            start: Position::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn from_min_size(pos: impl Into<Position>, size: impl Into<Size>) -> Rectangle {
        Rectangle {
            start: pos.into(),
            size: size.into(),
        }
    }

    pub fn top_left(&self) -> Position {
        self.start
    }

    pub fn bottom_right(&self) -> Position {
        Position {
            x: self.start.x + self.size.width,
            y: self.start.y + self.size.height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    pub fn contains_pt(&self, point: Position) -> bool {
        self.x_range().contains(&point.x) && self.y_range().contains(&point.y)
    }

    pub fn x_range(&self) -> std::ops::Range<i32> {
        self.start.x..self.bottom_right().x
    }

    pub fn y_range(&self) -> std::ops::Range<i32> {
        self.start.y..self.bottom_right().y
    }
}
