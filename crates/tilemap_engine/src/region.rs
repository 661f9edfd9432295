use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Position, Size};

/// A set of tile cells, e.g. the selected area of a map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    cells: BTreeSet<Position>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a rectangular region with its top left corner at `start`.
    pub fn from_rect(start: impl Into<Position>, size: impl Into<Size>) -> Self {
        let start = start.into();
        let size = size.into();
        let mut cells = BTreeSet::new();
        for y in start.y..start.y + size.height {
            for x in start.x..start.x + size.width {
                cells.insert(Position::new(x, y));
            }
        }
        Self { cells }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, pos: impl Into<Position>) -> bool {
        self.cells.contains(&pos.into())
    }

    pub fn insert(&mut self, pos: impl Into<Position>) -> bool {
        self.cells.insert(pos.into())
    }

    pub fn remove(&mut self, pos: impl Into<Position>) -> bool {
        self.cells.remove(&pos.into())
    }

    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells.iter().copied()
    }

    pub fn united(&self, other: &Region) -> Region {
        Region {
            cells: self.cells.union(&other.cells).copied().collect(),
        }
    }

    pub fn subtracted(&self, other: &Region) -> Region {
        Region {
            cells: self.cells.difference(&other.cells).copied().collect(),
        }
    }

    pub fn translated(&self, offset: impl Into<Position>) -> Region {
        let offset = offset.into();
        Region {
            cells: self.cells.iter().map(|p| *p + offset).collect(),
        }
    }

    /// Returns the top left and bottom right cell, or `None` for an empty region.
    pub fn bounds(&self) -> Option<(Position, Position)> {
        let mut it = self.cells.iter();
        let first = *it.next()?;
        Some(it.fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))))
    }
}

impl FromIterator<Position> for Region {
    fn from_iter<T: IntoIterator<Item = Position>>(iter: T) -> Self {
        Region {
            cells: iter.into_iter().collect(),
        }
    }
}
