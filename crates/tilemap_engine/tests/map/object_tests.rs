use pretty_assertions::assert_eq;
use tilemap_engine::{LayerId, LayerType, Map, MapError, ObjectId};

use crate::create_test_map;

fn create_group_with_objects(count: usize) -> (Map, LayerId, Vec<ObjectId>) {
    let mut map = create_test_map();
    let group = map.create_layer(LayerType::ObjectGroup, "objects");
    let group_id = group.id();
    map.insert_layer(None, 0, group).unwrap();
    let mut ids = Vec::new();
    for i in 0..count {
        let object = map.create_object(format!("o{i}"), "");
        ids.push(object.id());
        map.insert_object(group_id, i, object).unwrap();
    }
    (map, group_id, ids)
}

fn order(map: &Map, group: LayerId) -> Vec<ObjectId> {
    map.object_group(group).unwrap().objects().iter().map(|o| o.id()).collect()
}

#[test]
fn test_insert_and_remove_objects() {
    let (mut map, group, ids) = create_group_with_objects(3);
    assert_eq!(map.object_index(ids[2]), Some(2));
    assert_eq!(map.object_group_of(ids[1]), Some(group));

    let removed = map.remove_object_at(group, 1).unwrap();
    assert_eq!(removed.id(), ids[1]);
    assert_eq!(map.object_group_of(ids[1]), None);
    assert_eq!(map.object_index(ids[2]), Some(1));

    let err = map.remove_object_at(group, 5).unwrap_err();
    assert_eq!(err.downcast_ref::<MapError>(), Some(&MapError::IndexOutOfRange { index: 5, len: 2 }));
}

#[test]
fn test_insert_object_into_tile_layer_fails() {
    let mut map = create_test_map();
    let tiles = map.create_layer(LayerType::TileLayer, "tiles");
    let tiles_id = tiles.id();
    map.insert_layer(None, 0, tiles).unwrap();
    let object = map.create_object("o", "");

    let err = map.insert_object(tiles_id, 0, object).unwrap_err();
    assert_eq!(err.downcast_ref::<MapError>(), Some(&MapError::NotAnObjectGroup(tiles_id)));
}

#[test]
fn test_move_objects_down() {
    let (mut map, group, ids) = create_group_with_objects(5);
    // move o0,o1 in front of o4
    map.move_objects(group, 0, 4, 2).unwrap();
    assert_eq!(order(&map, group), vec![ids[2], ids[3], ids[0], ids[1], ids[4]]);
}

#[test]
fn test_move_objects_up() {
    let (mut map, group, ids) = create_group_with_objects(5);
    map.move_objects(group, 3, 1, 2).unwrap();
    assert_eq!(order(&map, group), vec![ids[0], ids[3], ids[4], ids[1], ids[2]]);
}

#[test]
fn test_move_objects_to_end() {
    let (mut map, group, ids) = create_group_with_objects(3);
    map.move_objects(group, 0, 3, 1).unwrap();
    assert_eq!(order(&map, group), vec![ids[1], ids[2], ids[0]]);
}

#[test]
fn test_move_objects_into_own_range_fails() {
    let (mut map, group, ids) = create_group_with_objects(3);
    assert!(map.move_objects(group, 0, 1, 1).is_err());
    assert!(map.move_objects(group, 0, 2, 2).is_err());
    assert_eq!(order(&map, group), ids);
}

#[test]
fn test_object_mut_changes_object() {
    let (mut map, _group, ids) = create_group_with_objects(1);
    map.object_mut(ids[0]).unwrap().name = "renamed".to_string();
    assert_eq!(map.object(ids[0]).unwrap().name, "renamed");
}
