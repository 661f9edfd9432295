use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ObjectGroup, PointF, Position, RectF, Rectangle, Size};

/// Handle of a layer, allocated by the owning [`crate::Map`].
///
/// Ids stay the same while a layer is detached from the map (e.g. owned by an
/// undo operation) and re-inserted later.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u32);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerType {
    TileLayer,
    ObjectGroup,
    ImageLayer,
    GroupLayer,
}

impl LayerType {
    pub const ALL: [LayerType; 4] = [LayerType::TileLayer, LayerType::ObjectGroup, LayerType::ImageLayer, LayerType::GroupLayer];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    pub name: String,
    pub is_visible: bool,
    pub opacity: f32,
    pub offset: PointF,
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            name: String::new(),
            is_visible: true,
            opacity: 1.0,
            offset: PointF::ZERO,
        }
    }
}

/// A grid of tile references. `None` is an empty cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    size: Size,
    cells: Vec<Option<u32>>,
}

impl TileLayer {
    pub fn new(size: impl Into<Size>) -> Self {
        let size = size.into();
        let len = (size.width.max(0) * size.height.max(0)) as usize;
        Self { size, cells: vec![None; len] }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    fn cell_index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.size.width || y >= self.size.height {
            return None;
        }
        Some((y * self.size.width + x) as usize)
    }

    pub fn cell_at(&self, x: i32, y: i32) -> Option<u32> {
        self.cell_index(x, y).and_then(|i| self.cells[i])
    }

    /// Sets a cell, out of bounds coordinates are ignored.
    pub fn set_cell(&mut self, x: i32, y: i32, tile: Option<u32>) {
        if let Some(i) = self.cell_index(x, y) {
            self.cells[i] = tile;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Shifts the cells inside `bounds` by `offset`. Cells shifted out of the
    /// bounds are dropped unless the axis wraps around.
    pub fn offset_tiles(&mut self, offset: Position, bounds: Rectangle, wrap_x: bool, wrap_y: bool) {
        let source = self.clone();
        for y in bounds.y_range() {
            for x in bounds.x_range() {
                let mut src = Position::new(x, y) - offset;
                if wrap_x && bounds.size.width > 0 {
                    src.x = bounds.start.x + (src.x - bounds.start.x).rem_euclid(bounds.size.width);
                }
                if wrap_y && bounds.size.height > 0 {
                    src.y = bounds.start.y + (src.y - bounds.start.y).rem_euclid(bounds.size.height);
                }
                let tile = if bounds.contains_pt(src) { source.cell_at(src.x, src.y) } else { None };
                self.set_cell(x, y, tile);
            }
        }
    }

    /// Returns a copy of this layer with the non-empty cells of `upper` drawn on top.
    /// The result covers both layers.
    pub fn merged_with(&self, upper: &TileLayer) -> TileLayer {
        let size = Size::new(self.size.width.max(upper.size.width), self.size.height.max(upper.size.height));
        let mut merged = TileLayer::new(size);
        for source in [self, upper] {
            for y in 0..source.size.height {
                for x in 0..source.size.width {
                    if let Some(tile) = source.cell_at(x, y) {
                        merged.set_cell(x, y, Some(tile));
                    }
                }
            }
        }
        merged
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageLayer {
    pub image_source: Option<String>,
    pub transparent_color: Option<[u8; 3]>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupLayer {
    pub(crate) layers: Vec<Layer>,
}

impl GroupLayer {
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer_at(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Adds a child to a detached group, e.g. while building a layer tree
    /// before it is inserted into a map.
    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LayerKind {
    Tile(TileLayer),
    Objects(ObjectGroup),
    Image(ImageLayer),
    Group(GroupLayer),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    id: LayerId,
    pub properties: Properties,
    pub kind: LayerKind,
}

impl Layer {
    pub(crate) fn new(id: LayerId, name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id,
            properties: Properties {
                name: name.into(),
                ..Default::default()
            },
            kind,
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: LayerId) {
        self.id = id;
    }

    pub fn layer_type(&self) -> LayerType {
        match self.kind {
            LayerKind::Tile(_) => LayerType::TileLayer,
            LayerKind::Objects(_) => LayerType::ObjectGroup,
            LayerKind::Image(_) => LayerType::ImageLayer,
            LayerKind::Group(_) => LayerType::GroupLayer,
        }
    }

    pub fn name(&self) -> &str {
        &self.properties.name
    }

    pub fn is_visible(&self) -> bool {
        self.properties.is_visible
    }

    pub fn opacity(&self) -> f32 {
        self.properties.opacity
    }

    pub fn offset(&self) -> PointF {
        self.properties.offset
    }

    pub fn as_group_layer(&self) -> Option<&GroupLayer> {
        match &self.kind {
            LayerKind::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_group_layer_mut(&mut self) -> Option<&mut GroupLayer> {
        match &mut self.kind {
            LayerKind::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_object_group(&self) -> Option<&ObjectGroup> {
        match &self.kind {
            LayerKind::Objects(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_object_group_mut(&mut self) -> Option<&mut ObjectGroup> {
        match &mut self.kind {
            LayerKind::Objects(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_tile_layer(&self) -> Option<&TileLayer> {
        match &self.kind {
            LayerKind::Tile(tiles) => Some(tiles),
            _ => None,
        }
    }

    pub fn as_tile_layer_mut(&mut self) -> Option<&mut TileLayer> {
        match &mut self.kind {
            LayerKind::Tile(tiles) => Some(tiles),
            _ => None,
        }
    }

    pub fn is_group_layer(&self) -> bool {
        matches!(self.kind, LayerKind::Group(_))
    }

    pub fn is_object_group(&self) -> bool {
        matches!(self.kind, LayerKind::Objects(_))
    }

    /// Number of direct children, 0 for everything but group layers.
    pub fn child_count(&self) -> usize {
        self.as_group_layer().map_or(0, GroupLayer::layer_count)
    }

    /// Whether `upper` can be merged down onto this layer.
    pub fn can_merge_with(&self, upper: &Layer) -> bool {
        matches!(
            (&self.kind, &upper.kind),
            (LayerKind::Tile(_), LayerKind::Tile(_)) | (LayerKind::Objects(_), LayerKind::Objects(_))
        )
    }

    /// Moves the content inside `bounds` by `offset` tiles, `tile_size`
    /// converts to pixels for object groups and image layers. Image layers
    /// never wrap, group layers are left as they are.
    pub fn offset_content(&mut self, offset: Position, bounds: Rectangle, wrap_x: bool, wrap_y: bool, tile_size: Size) {
        let to_pixels = |p: Position| PointF::new(f64::from(p.x * tile_size.width), f64::from(p.y * tile_size.height));
        match &mut self.kind {
            LayerKind::Tile(tiles) => tiles.offset_tiles(offset, bounds, wrap_x, wrap_y),
            LayerKind::Objects(group) => {
                let start = to_pixels(bounds.top_left());
                let end = to_pixels(bounds.bottom_right());
                let pixel_bounds = RectF::new(start, (end.x - start.x, end.y - start.y));
                group.offset_objects(to_pixels(offset), pixel_bounds, wrap_x, wrap_y);
            }
            LayerKind::Image(_) => self.properties.offset = self.properties.offset + to_pixels(offset),
            LayerKind::Group(_) => {}
        }
    }

    /// Calls `f` for this layer and every layer below it, parents first.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Layer)) {
        f(self);
        if let LayerKind::Group(group) = &self.kind {
            for child in &group.layers {
                child.visit(f);
            }
        }
    }

    /// Ids of this layer and all layers below it, parents first.
    pub fn subtree_ids(&self) -> Vec<LayerId> {
        let mut ids = Vec::new();
        self.visit(&mut |l| ids.push(l.id()));
        ids
    }
}
