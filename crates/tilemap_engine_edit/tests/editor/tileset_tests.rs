//! Tests for adding, removing and replacing tilesets

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tilemap_engine_edit::{DocumentEvent, MapDocument, MapError, SharedTileset, Tileset, UndoState};

use crate::{create_test_map, record_events};

fn tileset(name: &str) -> SharedTileset {
    Tileset::new(name, (32, 32)).with_image(format!("{name}.png"), 64, 8).into_shared()
}

fn tileset_names(doc: &MapDocument) -> Vec<String> {
    doc.map().tilesets().iter().map(|t| t.name.clone()).collect()
}

// ============================================================================
// Add
// ============================================================================

#[test]
fn test_add_tileset() {
    let mut doc = MapDocument::new(create_test_map());
    let events = record_events(&mut doc);

    let index = doc.add_tileset(tileset("grass")).unwrap();

    assert_eq!(index, 0);
    assert_eq!(tileset_names(&doc), vec!["grass"]);
    assert_eq!(doc.undo_description(), Some("Add Tileset".to_string()));
    assert_eq!(
        *events.lock(),
        vec![DocumentEvent::TilesetAboutToBeAdded { index: 0 }, DocumentEvent::TilesetAdded { index: 0 }]
    );

    events.lock().clear();
    doc.undo().unwrap();
    assert!(doc.map().tilesets().is_empty());
    assert_eq!(
        *events.lock(),
        vec![DocumentEvent::TilesetAboutToBeRemoved { index: 0 }, DocumentEvent::TilesetRemoved { index: 0 }]
    );

    doc.redo().unwrap();
    assert_eq!(tileset_names(&doc), vec!["grass"]);
}

#[test]
fn test_add_same_tileset_twice_is_error() {
    let mut doc = MapDocument::new(create_test_map());
    let grass = tileset("grass");
    doc.add_tileset(grass.clone()).unwrap();

    let err = doc.add_tileset(grass).unwrap_err();

    assert_eq!(err.downcast_ref::<MapError>(), Some(&MapError::TilesetAlreadyInMap("grass".to_string())));
    assert_eq!(doc.undo_stack_len(), 1);
}

#[test]
fn test_equal_tilesets_are_different_tilesets() {
    let mut doc = MapDocument::new(create_test_map());

    doc.add_tileset(tileset("grass")).unwrap();
    doc.add_tileset(tileset("grass")).unwrap();

    assert_eq!(tileset_names(&doc), vec!["grass", "grass"]);
}

#[test]
fn test_add_tilesets_is_one_entry() {
    let mut doc = MapDocument::new(create_test_map());
    doc.add_tileset(tileset("grass")).unwrap();

    doc.add_tilesets(vec![tileset("water"), tileset("rock")]).unwrap();

    assert_eq!(tileset_names(&doc), vec!["grass", "water", "rock"]);
    assert_eq!(doc.undo_stack_len(), 2);
    assert_eq!(doc.undo_description(), Some("Add 2 Tilesets".to_string()));

    doc.undo().unwrap();
    assert_eq!(tileset_names(&doc), vec!["grass"]);
    doc.redo().unwrap();
    assert_eq!(tileset_names(&doc), vec!["grass", "water", "rock"]);
}

#[test]
fn test_add_tilesets_with_duplicate_changes_nothing() {
    let mut doc = MapDocument::new(create_test_map());
    let water = tileset("water");
    let events = record_events(&mut doc);

    assert!(doc.add_tilesets(vec![water.clone(), tileset("rock"), water]).is_err());

    assert!(doc.map().tilesets().is_empty());
    assert_eq!(doc.undo_stack_len(), 0);
    assert!(events.lock().is_empty());
}

#[test]
fn test_add_no_tilesets_pushes_nothing() {
    let mut doc = MapDocument::new(create_test_map());
    doc.add_tilesets(Vec::new()).unwrap();
    assert_eq!(doc.undo_stack_len(), 0);
}

// ============================================================================
// Remove / Replace
// ============================================================================

#[test]
fn test_remove_tileset_restores_position() {
    let mut doc = MapDocument::new(create_test_map());
    let water = tileset("water");
    doc.add_tilesets(vec![tileset("grass"), water.clone(), tileset("rock")]).unwrap();

    doc.remove_tileset(1).unwrap();
    assert_eq!(tileset_names(&doc), vec!["grass", "rock"]);
    assert_eq!(doc.undo_description(), Some("Remove Tileset".to_string()));

    doc.undo().unwrap();
    assert_eq!(tileset_names(&doc), vec!["grass", "water", "rock"]);
    assert!(Arc::ptr_eq(&doc.map().tilesets()[1], &water));
}

#[test]
fn test_remove_tileset_out_of_range_is_error() {
    let mut doc = MapDocument::new(create_test_map());
    doc.add_tileset(tileset("grass")).unwrap();

    let err = doc.remove_tileset(3).unwrap_err();

    assert_eq!(err.downcast_ref::<MapError>(), Some(&MapError::IndexOutOfRange { index: 3, len: 1 }));
    assert_eq!(doc.undo_stack_len(), 1);
}

#[test]
fn test_change_tileset() {
    let mut doc = MapDocument::new(create_test_map());
    let grass = tileset("grass");
    doc.add_tileset(grass.clone()).unwrap();
    let events = record_events(&mut doc);

    doc.change_tileset(0, tileset("desert")).unwrap();

    assert_eq!(tileset_names(&doc), vec!["desert"]);
    assert_eq!(doc.undo_description(), Some("Replace Tileset".to_string()));
    assert_eq!(*events.lock(), vec![DocumentEvent::TilesetReplaced { index: 0 }]);

    doc.undo().unwrap();
    assert!(Arc::ptr_eq(&doc.map().tilesets()[0], &grass));
    doc.redo().unwrap();
    assert_eq!(tileset_names(&doc), vec!["desert"]);
}

#[test]
fn test_change_to_tileset_in_map_is_error() {
    let mut doc = MapDocument::new(create_test_map());
    let rock = tileset("rock");
    doc.add_tilesets(vec![tileset("grass"), rock.clone()]).unwrap();

    let err = doc.change_tileset(0, rock).unwrap_err();

    assert_eq!(err.downcast_ref::<MapError>(), Some(&MapError::TilesetAlreadyInMap("rock".to_string())));
    assert_eq!(tileset_names(&doc), vec!["grass", "rock"]);
    assert_eq!(doc.undo_stack_len(), 1);
}

#[test]
fn test_replace_with_tileset_in_map_only_removes() {
    let mut doc = MapDocument::new(create_test_map());
    let rock = tileset("rock");
    doc.add_tilesets(vec![tileset("grass"), rock.clone()]).unwrap();
    let events = record_events(&mut doc);

    let old = doc.replace_tileset(0, rock).unwrap();

    assert_eq!(old.name, "grass");
    assert_eq!(tileset_names(&doc), vec!["rock"]);
    assert_eq!(*events.lock(), vec![DocumentEvent::TilesetRemoved { index: 0 }]);
}
