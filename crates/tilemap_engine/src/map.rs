use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    EngineResult, GroupLayer, ImageLayer, Layer, LayerId, LayerKind, LayerType, MapError, MapObject, ObjectGroup, ObjectId, Position, Rectangle,
    SharedTileset, Size, TileLayer,
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Orthogonal,
    Isometric,
    Staggered,
    Hexagonal,
}

/// Root aggregate: an ordered forest of layers plus the id allocators.
///
/// Layers do not point at their parents. The map keeps a parent index and an
/// object owner index instead, both updated on every insert and take, so a
/// layer or object detached from the map carries no stale back-reference.
#[derive(Clone, Debug, Default)]
pub struct Map {
    pub orientation: Orientation,
    size: Size,
    tile_size: Size,
    layers: Vec<Layer>,
    tilesets: Vec<SharedTileset>,

    next_layer_id: u32,
    next_object_id: u32,

    parents: HashMap<LayerId, Option<LayerId>>,
    object_owner: HashMap<ObjectId, LayerId>,
}

impl Map {
    pub fn new(orientation: Orientation, size: impl Into<Size>, tile_size: impl Into<Size>) -> Self {
        Self {
            orientation,
            size: size.into(),
            tile_size: tile_size.into(),
            next_layer_id: 1,
            next_object_id: 1,
            ..Default::default()
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn tile_size(&self) -> Size {
        self.tile_size
    }

    pub fn top_level_layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Children of `parent`, the top level layers for `None`.
    pub fn children(&self, parent: Option<LayerId>) -> EngineResult<&[Layer]> {
        match parent {
            None => Ok(&self.layers),
            Some(id) => {
                let layer = self.layer(id).ok_or(MapError::UnknownLayer(id))?;
                match layer.as_group_layer() {
                    Some(group) => Ok(group.layers()),
                    None => Err(MapError::NotAGroupLayer(id).into()),
                }
            }
        }
    }

    fn children_mut(&mut self, parent: Option<LayerId>) -> EngineResult<&mut Vec<Layer>> {
        match parent {
            None => Ok(&mut self.layers),
            Some(id) => {
                let layer = self.layer_mut(id).ok_or(MapError::UnknownLayer(id))?;
                match layer.as_group_layer_mut() {
                    Some(group) => Ok(&mut group.layers),
                    None => Err(MapError::NotAGroupLayer(id).into()),
                }
            }
        }
    }

    pub fn child_count(&self, parent: Option<LayerId>) -> EngineResult<usize> {
        Ok(self.children(parent)?.len())
    }

    pub fn layer_at(&self, parent: Option<LayerId>, index: usize) -> EngineResult<&Layer> {
        let children = self.children(parent)?;
        children.get(index).ok_or_else(|| MapError::IndexOutOfRange { index, len: children.len() }.into())
    }

    pub fn contains_layer(&self, id: LayerId) -> bool {
        self.parents.contains_key(&id)
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        let parent = *self.parents.get(&id)?;
        let siblings = match parent {
            None => &self.layers,
            Some(parent) => self.layer(parent)?.as_group_layer()?.layers(),
        };
        siblings.iter().find(|l| l.id() == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        let parent = *self.parents.get(&id)?;
        let siblings = match parent {
            None => &mut self.layers,
            Some(parent) => &mut self.layer_mut(parent)?.as_group_layer_mut()?.layers,
        };
        siblings.iter_mut().find(|l| l.id() == id)
    }

    /// Parent group of a layer, `None` for top level layers.
    pub fn parent_of(&self, id: LayerId) -> EngineResult<Option<LayerId>> {
        self.parents.get(&id).copied().ok_or_else(|| MapError::UnknownLayer(id).into())
    }

    /// Index of a layer within its parent container.
    pub fn sibling_index(&self, id: LayerId) -> EngineResult<usize> {
        let parent = self.parent_of(id)?;
        self.children(parent)?
            .iter()
            .position(|l| l.id() == id)
            .ok_or_else(|| MapError::UnknownLayer(id).into())
    }

    /// Whether `id` is `root` or lies somewhere below it.
    pub fn is_in_subtree(&self, id: LayerId, root: LayerId) -> bool {
        let mut cur = Some(id);
        while let Some(layer) = cur {
            if layer == root {
                return true;
            }
            cur = self.parents.get(&layer).copied().flatten();
        }
        false
    }

    /// Every layer in the map, depth first with parents before their children.
    pub fn all_layers(&self) -> Vec<&Layer> {
        let mut result = Vec::new();
        for layer in &self.layers {
            layer.visit(&mut |l| result.push(l));
        }
        result
    }

    pub fn layer_count(&self) -> usize {
        self.parents.len()
    }

    pub fn layer_count_of_type(&self, layer_type: LayerType) -> usize {
        self.all_layers().iter().filter(|l| l.layer_type() == layer_type).count()
    }

    pub fn insert_layer(&mut self, parent: Option<LayerId>, index: usize, layer: Layer) -> EngineResult<()> {
        let len = self.child_count(parent)?;
        if index > len {
            return Err(MapError::IndexOutOfRange { index, len }.into());
        }
        self.ensure_detached(&layer)?;
        self.register(&layer, parent);
        self.children_mut(parent)?.insert(index, layer);
        Ok(())
    }

    pub fn take_layer_at(&mut self, parent: Option<LayerId>, index: usize) -> EngineResult<Layer> {
        let children = self.children_mut(parent)?;
        if index >= children.len() {
            return Err(MapError::IndexOutOfRange { index, len: children.len() }.into());
        }
        let layer = children.remove(index);
        self.unregister(&layer);
        Ok(layer)
    }

    /// Fails when `layer` or anything below it is already part of the map.
    pub fn ensure_detached(&self, layer: &Layer) -> EngineResult<()> {
        let mut result = Ok(());
        layer.visit(&mut |l| {
            if result.is_err() {
                return;
            }
            if self.parents.contains_key(&l.id()) {
                result = Err(MapError::LayerAlreadyInMap(l.id()));
            } else if let Some(group) = l.as_object_group() {
                if let Some(o) = group.objects().iter().find(|o| self.object_owner.contains_key(&o.id())) {
                    result = Err(MapError::ObjectAlreadyInMap(o.id()));
                }
            }
        });
        result.map_err(Into::into)
    }

    fn register(&mut self, layer: &Layer, parent: Option<LayerId>) {
        self.parents.insert(layer.id(), parent);
        self.next_layer_id = self.next_layer_id.max(layer.id().0 + 1);
        match &layer.kind {
            LayerKind::Group(group) => {
                for child in group.layers() {
                    self.register(child, Some(layer.id()));
                }
            }
            LayerKind::Objects(group) => {
                for object in group.objects() {
                    self.object_owner.insert(object.id(), layer.id());
                    self.next_object_id = self.next_object_id.max(object.id().0 + 1);
                }
            }
            _ => {}
        }
    }

    fn unregister(&mut self, layer: &Layer) {
        layer.visit(&mut |l| {
            self.parents.remove(&l.id());
            if let Some(group) = l.as_object_group() {
                for object in group.objects() {
                    self.object_owner.remove(&object.id());
                }
            }
        });
    }

    pub fn object_group(&self, id: LayerId) -> EngineResult<&ObjectGroup> {
        let layer = self.layer(id).ok_or(MapError::UnknownLayer(id))?;
        layer.as_object_group().ok_or_else(|| MapError::NotAnObjectGroup(id).into())
    }

    fn object_group_mut(&mut self, id: LayerId) -> EngineResult<&mut ObjectGroup> {
        let layer = self.layer_mut(id).ok_or(MapError::UnknownLayer(id))?;
        layer.as_object_group_mut().ok_or_else(|| MapError::NotAnObjectGroup(id).into())
    }

    /// Owning object group of an inserted object.
    pub fn object_group_of(&self, id: ObjectId) -> Option<LayerId> {
        self.object_owner.get(&id).copied()
    }

    pub fn object(&self, id: ObjectId) -> Option<&MapObject> {
        let group = self.object_group(self.object_group_of(id)?).ok()?;
        group.objects().iter().find(|o| o.id() == id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut MapObject> {
        let group = self.object_group_of(id)?;
        self.object_group_mut(group).ok()?.objects.iter_mut().find(|o| o.id() == id)
    }

    pub fn object_index(&self, id: ObjectId) -> Option<usize> {
        self.object_group(self.object_group_of(id)?).ok()?.index_of(id)
    }

    pub fn insert_object(&mut self, group: LayerId, index: usize, object: MapObject) -> EngineResult<()> {
        if self.object_owner.contains_key(&object.id()) {
            return Err(MapError::ObjectAlreadyInMap(object.id()).into());
        }
        let objects = &mut self.object_group_mut(group)?.objects;
        if index > objects.len() {
            return Err(MapError::IndexOutOfRange { index, len: objects.len() }.into());
        }
        let id = object.id();
        objects.insert(index, object);
        self.object_owner.insert(id, group);
        self.next_object_id = self.next_object_id.max(id.0 + 1);
        Ok(())
    }

    pub fn remove_object_at(&mut self, group: LayerId, index: usize) -> EngineResult<MapObject> {
        let objects = &mut self.object_group_mut(group)?.objects;
        if index >= objects.len() {
            return Err(MapError::IndexOutOfRange { index, len: objects.len() }.into());
        }
        let object = objects.remove(index);
        self.object_owner.remove(&object.id());
        Ok(object)
    }

    /// Moves `count` objects starting at `from` so they end up before the
    /// object that was at `to` before the move.
    ///
    /// `to` may not lie within `from..=from + count`, such a move is a no-op
    /// and rejected.
    pub fn move_objects(&mut self, group: LayerId, from: usize, to: usize, count: usize) -> EngineResult<()> {
        let objects = &mut self.object_group_mut(group)?.objects;
        if !is_valid_move(objects.len(), from, to, count) {
            return Err(MapError::InvalidMove { from, to, count }.into());
        }
        let moved: Vec<MapObject> = objects.drain(from..from + count).collect();
        let to = if to > from { to - count } else { to };
        objects.splice(to..to, moved);
        Ok(())
    }

    pub fn tilesets(&self) -> &[SharedTileset] {
        &self.tilesets
    }

    pub fn tileset_count(&self) -> usize {
        self.tilesets.len()
    }

    pub fn tileset_at(&self, index: usize) -> EngineResult<&SharedTileset> {
        self.tilesets.get(index).ok_or_else(|| {
            MapError::IndexOutOfRange {
                index,
                len: self.tilesets.len(),
            }
            .into()
        })
    }

    /// Index of `tileset`, compared by identity.
    pub fn index_of_tileset(&self, tileset: &SharedTileset) -> Option<usize> {
        self.tilesets.iter().position(|t| Arc::ptr_eq(t, tileset))
    }

    pub fn insert_tileset(&mut self, index: usize, tileset: SharedTileset) -> EngineResult<()> {
        if index > self.tilesets.len() {
            return Err(MapError::IndexOutOfRange {
                index,
                len: self.tilesets.len(),
            }
            .into());
        }
        if self.index_of_tileset(&tileset).is_some() {
            return Err(MapError::TilesetAlreadyInMap(tileset.name.clone()).into());
        }
        self.tilesets.insert(index, tileset);
        Ok(())
    }

    pub fn remove_tileset_at(&mut self, index: usize) -> EngineResult<SharedTileset> {
        self.tileset_at(index)?;
        Ok(self.tilesets.remove(index))
    }

    /// Puts `tileset` at `index` and returns the old tileset together with
    /// whether `tileset` was added. A tileset that is already used elsewhere
    /// in the map is not added twice, the old one is only removed then.
    pub fn replace_tileset(&mut self, index: usize, tileset: SharedTileset) -> EngineResult<(SharedTileset, bool)> {
        self.tileset_at(index)?;
        match self.index_of_tileset(&tileset) {
            None => Ok((std::mem::replace(&mut self.tilesets[index], tileset), true)),
            Some(existing) if existing == index => Err(MapError::TilesetAlreadyInMap(tileset.name.clone()).into()),
            Some(_) => Ok((self.tilesets.remove(index), false)),
        }
    }

    /// Detached copy of `layer` with fresh ids and its content moved by
    /// `offset` tiles, see [`Layer::offset_content`].
    pub fn offset_layer(&mut self, layer: LayerId, offset: Position, bounds: Rectangle, wrap_x: bool, wrap_y: bool) -> EngineResult<Layer> {
        let source = self.layer(layer).ok_or(MapError::UnknownLayer(layer))?.clone();
        let mut copy = self.clone_layer(&source);
        copy.offset_content(offset, bounds, wrap_x, wrap_y, self.tile_size);
        Ok(copy)
    }

    pub fn create_layer(&mut self, layer_type: LayerType, name: impl Into<String>) -> Layer {
        let kind = match layer_type {
            LayerType::TileLayer => LayerKind::Tile(TileLayer::new(self.size)),
            LayerType::ObjectGroup => LayerKind::Objects(ObjectGroup::default()),
            LayerType::ImageLayer => LayerKind::Image(ImageLayer::default()),
            LayerType::GroupLayer => LayerKind::Group(GroupLayer::default()),
        };
        Layer::new(self.alloc_layer_id(), name, kind)
    }

    pub fn create_object(&mut self, name: impl Into<String>, object_type: impl Into<String>) -> MapObject {
        MapObject::new(self.alloc_object_id(), name, object_type)
    }

    /// Deep copy of a layer with fresh ids for every layer and object in it.
    pub fn clone_layer(&mut self, layer: &Layer) -> Layer {
        let mut copy = layer.clone();
        self.assign_fresh_ids(&mut copy);
        copy
    }

    pub fn clone_object(&mut self, object: &MapObject) -> MapObject {
        let mut copy = object.clone();
        copy.set_id(self.alloc_object_id());
        copy
    }

    fn assign_fresh_ids(&mut self, layer: &mut Layer) {
        layer.set_id(self.alloc_layer_id());
        match &mut layer.kind {
            LayerKind::Group(group) => {
                for child in &mut group.layers {
                    self.assign_fresh_ids(child);
                }
            }
            LayerKind::Objects(group) => {
                for object in &mut group.objects {
                    object.set_id(self.alloc_object_id());
                }
            }
            _ => {}
        }
    }

    /// Builds the result of merging `upper` down onto `lower` without touching
    /// the map. The result has a fresh id and the properties of `lower`.
    pub fn merged_layer(&mut self, lower: LayerId, upper: LayerId) -> EngineResult<Layer> {
        let lower_layer = self.layer(lower).ok_or(MapError::UnknownLayer(lower))?;
        let upper_layer = self.layer(upper).ok_or(MapError::UnknownLayer(upper))?;
        let kind = match (&lower_layer.kind, &upper_layer.kind) {
            (LayerKind::Tile(a), LayerKind::Tile(b)) => LayerKind::Tile(a.merged_with(b)),
            (LayerKind::Objects(a), LayerKind::Objects(b)) => {
                let mut group = a.clone();
                group.objects.extend(b.objects.iter().cloned());
                LayerKind::Objects(group)
            }
            _ => {
                log::debug!("layer {upper} can't be merged onto {lower}");
                return Err(anyhow::anyhow!("Can't merge {upper} onto {lower}"));
            }
        };
        let mut merged = Layer::new(lower, "", kind);
        merged.properties = lower_layer.properties.clone();
        self.assign_fresh_ids(&mut merged);
        Ok(merged)
    }

    fn alloc_layer_id(&mut self) -> LayerId {
        let id = LayerId(self.next_layer_id.max(1));
        self.next_layer_id = id.0 + 1;
        id
    }

    fn alloc_object_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_object_id.max(1));
        self.next_object_id = id.0 + 1;
        id
    }
}

/// Same-parent row move rule of tree views: the destination must not fall
/// inside the moved range or directly behind it.
pub fn is_valid_move(len: usize, from: usize, to: usize, count: usize) -> bool {
    let Some(end) = from.checked_add(count) else {
        return false;
    };
    count > 0 && end <= len && to <= len && (to < from || to > end)
}
