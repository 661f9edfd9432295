//! Tests for layer operations (add, remove, move, duplicate, merge, offset)

use pretty_assertions::assert_eq;
use tilemap_engine_edit::{DocumentEvent, EditorOptions, LayerId, LayerType, MapDocument, PointF, Position, Rectangle, UndoState};

use crate::{add_to_group, create_object_document, create_test_document, create_test_map, layer_names, record_events};

// ============================================================================
// Add Layer Tests
// ============================================================================

#[test]
fn test_add_layer_names_by_type() {
    let (mut doc, _) = create_test_document(&[(LayerType::TileLayer, "Ground")]);

    doc.add_layer(LayerType::TileLayer).unwrap();
    doc.add_layer(LayerType::ObjectGroup).unwrap();
    doc.add_layer(LayerType::ImageLayer).unwrap();
    doc.add_layer(LayerType::GroupLayer).unwrap();

    assert_eq!(layer_names(&doc), vec!["Ground", "Tile Layer 2", "Object Layer 1", "Image Layer 1", "Group 1"]);
    assert_eq!(doc.undo_stack_len(), 4);
    assert_eq!(doc.undo_description(), Some("Add Layer".to_string()));
}

#[test]
fn test_generated_texts_have_no_isolation_marks() {
    let (mut doc, group, objects) = create_object_document(&["a", "b"]);
    doc.add_layer(LayerType::TileLayer).unwrap();
    doc.remove_objects(&objects).unwrap();

    let texts = [layer_names(&doc)[1].clone(), doc.undo_description().unwrap_or_default()];
    assert_eq!(texts, ["Tile Layer 1".to_string(), "Remove 2 Objects".to_string()]);
    assert!(texts.iter().all(|t| !t.contains(['\u{2068}', '\u{2069}'])));
    assert!(doc.map().object_group(group).unwrap().objects().is_empty());
}

#[test]
fn test_add_layer_goes_above_current_and_becomes_current() {
    let (mut doc, layers) = create_test_document(&[(LayerType::TileLayer, "A"), (LayerType::TileLayer, "B")]);
    doc.set_current_layer(Some(layers[0])).unwrap();
    let events = record_events(&mut doc);

    let id = doc.add_layer(LayerType::TileLayer).unwrap();

    assert_eq!(layer_names(&doc), vec!["A", "Tile Layer 3", "B"]);
    assert_eq!(doc.current_layer(), Some(id));
    assert_eq!(events.lock().last(), Some(&DocumentEvent::EditLayerNameRequested));
}

#[test]
fn test_add_layer_inside_group() {
    let (mut doc, layers) = create_test_document(&[(LayerType::GroupLayer, "G")]);
    let child = doc.create_layer(LayerType::TileLayer, "Child");
    let child_id = child.id();
    doc.layer_model_mut().insert_layer(Some(layers[0]), 0, child).unwrap();
    doc.set_current_layer(Some(child_id)).unwrap();

    let id = doc.add_layer(LayerType::TileLayer).unwrap();

    assert_eq!(doc.map().parent_of(id).unwrap(), Some(layers[0]));
    assert_eq!(doc.map().sibling_index(id).unwrap(), 1);
}

#[test]
fn test_add_layer_without_name_request() {
    let options = EditorOptions {
        request_new_layer_name: false,
        ..Default::default()
    };
    let mut doc = MapDocument::with_options(create_test_map(), options);
    let events = record_events(&mut doc);

    let id = doc.add_layer(LayerType::TileLayer).unwrap();

    assert_eq!(doc.current_layer(), Some(id));
    assert!(!events.lock().contains(&DocumentEvent::EditLayerNameRequested));
}

#[test]
fn test_add_layer_undo() {
    let (mut doc, layers) = create_test_document(&[(LayerType::TileLayer, "Ground")]);

    doc.add_layer(LayerType::TileLayer).unwrap();
    doc.undo().unwrap();

    assert_eq!(layer_names(&doc), vec!["Ground"]);
    assert_eq!(doc.current_layer(), Some(layers[0]));

    doc.redo().unwrap();
    assert_eq!(layer_names(&doc), vec!["Ground", "Tile Layer 2"]);
}

// ============================================================================
// Remove Layer Tests
// ============================================================================

#[test]
fn test_remove_current_layer_selects_sibling() {
    let (mut doc, layers) = create_test_document(&[(LayerType::TileLayer, "A"), (LayerType::TileLayer, "B")]);
    doc.set_current_layer(Some(layers[1])).unwrap();

    doc.remove_layer(layers[1]).unwrap();

    assert_eq!(layer_names(&doc), vec!["A"]);
    assert_eq!(doc.current_layer(), Some(layers[0]));
    assert_eq!(doc.undo_description(), Some("Remove Layer".to_string()));

    doc.undo().unwrap();
    assert_eq!(layer_names(&doc), vec!["A", "B"]);
    assert_eq!(doc.current_layer(), Some(layers[1]));
}

#[test]
fn test_remove_unknown_layer_is_error() {
    let (mut doc, _) = create_test_document(&[(LayerType::TileLayer, "A")]);
    assert!(doc.remove_layer(LayerId(999)).is_err());
    assert_eq!(doc.undo_stack_len(), 0);
}

#[test]
fn test_remove_layer_clears_object_selection() {
    let (mut doc, _, objects) = create_object_document(&["a", "b"]);
    let group = doc.current_layer().unwrap();
    doc.set_selected_objects(objects.clone()).unwrap();

    doc.remove_layer(group).unwrap();

    assert!(doc.selected_objects().is_empty());
    assert_eq!(doc.current_layer(), None);

    doc.undo().unwrap();
    assert_eq!(doc.selected_objects(), objects.as_slice());
    assert_eq!(doc.current_layer(), Some(group));
}

// ============================================================================
// Move Layer Tests
// ============================================================================

#[test]
fn test_move_layer_up_and_down() {
    let (mut doc, layers) = create_test_document(&[(LayerType::TileLayer, "A"), (LayerType::TileLayer, "B"), (LayerType::TileLayer, "C")]);
    doc.set_current_layer(Some(layers[0])).unwrap();

    doc.move_layer_up(layers[0]).unwrap();
    assert_eq!(layer_names(&doc), vec!["B", "A", "C"]);
    assert_eq!(doc.current_layer(), Some(layers[0]));
    assert_eq!(doc.undo_description(), Some("Raise Layer".to_string()));

    doc.move_layer_down(layers[2]).unwrap();
    assert_eq!(layer_names(&doc), vec!["B", "C", "A"]);
    assert_eq!(doc.undo_description(), Some("Lower Layer".to_string()));

    doc.undo().unwrap();
    doc.undo().unwrap();
    assert_eq!(layer_names(&doc), vec!["A", "B", "C"]);
}

#[test]
fn test_move_layer_past_the_ends_is_noop() {
    let (mut doc, layers) = create_test_document(&[(LayerType::TileLayer, "A"), (LayerType::TileLayer, "B")]);

    doc.move_layer_up(layers[1]).unwrap();
    doc.move_layer_down(layers[0]).unwrap();

    assert_eq!(layer_names(&doc), vec!["A", "B"]);
    assert_eq!(doc.undo_stack_len(), 0);
}

// ============================================================================
// Duplicate Layer Tests
// ============================================================================

#[test]
fn test_duplicate_layer() {
    let (mut doc, group, objects) = create_object_document(&["a", "b"]);

    let copy = doc.duplicate_layer().unwrap().unwrap();

    assert_ne!(copy, group);
    assert_eq!(layer_names(&doc), vec!["Objects", "Copy of Objects"]);
    assert_eq!(doc.current_layer(), Some(copy));
    assert_eq!(doc.undo_description(), Some("Duplicate Layer".to_string()));
    assert_eq!(doc.object_model().row_count(None), 2);

    let copied: Vec<_> = doc.map().object_group(copy).unwrap().objects().iter().map(|o| o.id()).collect();
    assert_eq!(copied.len(), 2);
    assert!(copied.iter().all(|id| !objects.contains(id)));

    doc.undo().unwrap();
    assert_eq!(layer_names(&doc), vec!["Objects"]);
    assert_eq!(doc.current_layer(), Some(group));
}

#[test]
fn test_duplicate_without_current_layer() {
    let mut doc = MapDocument::new(create_test_map());
    assert_eq!(doc.duplicate_layer().unwrap(), None);
    assert_eq!(doc.undo_stack_len(), 0);
}

// ============================================================================
// Merge Layer Down Tests
// ============================================================================

#[test]
fn test_merge_layer_down() {
    let (mut doc, layers) = create_test_document(&[(LayerType::TileLayer, "Lower"), (LayerType::TileLayer, "Upper")]);
    doc.set_current_layer(Some(layers[1])).unwrap();

    assert!(doc.merge_layer_down().unwrap());

    assert_eq!(layer_names(&doc), vec!["Lower"]);
    let merged = doc.map().top_level_layers()[0].id();
    assert!(merged != layers[0] && merged != layers[1]);
    assert_eq!(doc.current_layer(), Some(merged));
    assert_eq!(doc.undo_stack_len(), 1);
    assert_eq!(doc.undo_description(), Some("Merge Layer Down".to_string()));
    assert_eq!(doc.get_undo_stack().lock().undo_operations()[0].operation_count(), 3);

    doc.undo().unwrap();
    assert_eq!(layer_names(&doc), vec!["Lower", "Upper"]);
    assert_eq!(doc.current_layer(), Some(layers[1]));
}

#[test]
fn test_merge_object_groups_keeps_all_objects() {
    let (mut doc, layers) = create_test_document(&[(LayerType::ObjectGroup, "Lower"), (LayerType::ObjectGroup, "Upper")]);
    for (layer, name) in [(layers[0], "a"), (layers[1], "b")] {
        let object = doc.create_object(name, "");
        doc.add_object(layer, object).unwrap();
    }
    doc.set_current_layer(Some(layers[1])).unwrap();

    assert!(doc.merge_layer_down().unwrap());

    let merged = doc.current_layer().unwrap();
    assert_eq!(crate::object_names(&doc, merged), vec!["a", "b"]);
    assert_eq!(doc.object_model().row_count(None), 1);
}

#[test]
fn test_merge_incompatible_layers_is_refused() {
    let (mut doc, layers) = create_test_document(&[(LayerType::ObjectGroup, "Objects"), (LayerType::TileLayer, "Tiles")]);
    doc.set_current_layer(Some(layers[1])).unwrap();

    assert!(!doc.merge_layer_down().unwrap());
    assert_eq!(doc.undo_stack_len(), 0);
}

#[test]
fn test_merge_bottom_layer_is_refused() {
    let (mut doc, layers) = create_test_document(&[(LayerType::TileLayer, "A"), (LayerType::TileLayer, "B")]);
    doc.set_current_layer(Some(layers[0])).unwrap();

    assert!(!doc.merge_layer_down().unwrap());
    assert_eq!(layer_names(&doc), vec!["A", "B"]);
}

// ============================================================================
// Offset Tests
// ============================================================================

#[test]
fn test_set_layer_offset_drag_is_one_entry() {
    let (mut doc, layers) = create_test_document(&[(LayerType::TileLayer, "A")]);

    {
        let mut guard = doc.begin_atomic_undo("Drag").unwrap();
        for x in 1..=3 {
            doc.set_layer_offset(layers[0], PointF::new(f64::from(x), 0.0)).unwrap();
        }
        guard.end();
    }

    assert_eq!(doc.map().layer(layers[0]).unwrap().offset(), PointF::new(3.0, 0.0));
    assert_eq!(doc.undo_stack_len(), 1);
    assert_eq!(doc.get_undo_stack().lock().undo_operations()[0].operation_count(), 1);

    doc.undo().unwrap();
    assert_eq!(doc.map().layer(layers[0]).unwrap().offset(), PointF::ZERO);
}

#[test]
fn test_set_same_layer_offset_pushes_nothing() {
    let (mut doc, layers) = create_test_document(&[(LayerType::TileLayer, "A")]);
    doc.set_layer_offset(layers[0], PointF::ZERO).unwrap();
    assert_eq!(doc.undo_stack_len(), 0);
}

// ============================================================================
// Offset Map Tests
// ============================================================================

/// Tile layer "Ground" with a tile at (0, 0) below an object group holding
/// one object at the origin.
fn create_offset_document() -> (MapDocument, LayerId, LayerId) {
    let mut map = create_test_map();
    let mut ground = map.create_layer(LayerType::TileLayer, "Ground");
    ground.as_tile_layer_mut().unwrap().set_cell(0, 0, Some(7));
    let mut objects = map.create_layer(LayerType::ObjectGroup, "Objects");
    let object = map.create_object("chest", "").with_size((16.0, 16.0));
    add_to_group(&mut objects, object);
    let (ground_id, objects_id) = (ground.id(), objects.id());
    map.insert_layer(None, 0, ground).unwrap();
    map.insert_layer(None, 1, objects).unwrap();
    (MapDocument::new(map), ground_id, objects_id)
}

#[test]
fn test_offset_map_single_layer() {
    let (mut doc, ground, _) = create_offset_document();
    doc.set_current_layer(Some(ground)).unwrap();

    doc.offset_map(&[ground], Position::new(-1, 2), Rectangle::from(0, 0, 10, 8), true, false).unwrap();

    let replaced = doc.map().top_level_layers()[0].id();
    assert_ne!(replaced, ground);
    assert_eq!(doc.current_layer(), Some(replaced));
    let tiles = doc.map().layer(replaced).unwrap().as_tile_layer().unwrap();
    assert_eq!(tiles.cell_at(9, 2), Some(7));
    assert_eq!(tiles.cell_at(0, 0), None);
    assert_eq!(doc.undo_description(), Some("Offset Layer".to_string()));

    doc.undo().unwrap();
    assert_eq!(doc.map().top_level_layers()[0].id(), ground);
    assert_eq!(doc.current_layer(), Some(ground));
    assert_eq!(doc.map().layer(ground).unwrap().as_tile_layer().unwrap().cell_at(0, 0), Some(7));
}

#[test]
fn test_offset_map_several_layers_is_one_entry() {
    let (mut doc, ground, objects) = create_offset_document();
    let object = doc.map().object_group(objects).unwrap().objects()[0].id();
    doc.set_current_layer(Some(objects)).unwrap();
    doc.set_selected_objects(vec![object]).unwrap();

    doc.offset_map(&[ground, objects], Position::new(1, 1), Rectangle::from(0, 0, 10, 8), false, false).unwrap();

    assert_eq!(doc.undo_stack_len(), 1);
    assert_eq!(doc.undo_description(), Some("Offset Map".to_string()));
    let moved = doc.map().top_level_layers()[1].as_object_group().unwrap().objects()[0].position;
    assert_eq!(moved, PointF::new(32.0, 32.0));

    doc.undo().unwrap();
    assert_eq!(
        doc.map().top_level_layers().iter().map(|l| l.id()).collect::<Vec<_>>(),
        vec![ground, objects]
    );
    assert_eq!(doc.current_layer(), Some(objects));
    assert_eq!(doc.selected_objects(), &[object]);

    doc.redo().unwrap();
    assert_eq!(doc.map().top_level_layers()[1].as_object_group().unwrap().objects()[0].position, PointF::new(32.0, 32.0));
}

#[test]
fn test_offset_map_unknown_layer_changes_nothing() {
    let (mut doc, ground, _) = create_offset_document();

    assert!(doc.offset_map(&[ground, LayerId(999)], Position::new(1, 0), Rectangle::from(0, 0, 10, 8), false, false).is_err());

    assert_eq!(doc.map().top_level_layers()[0].id(), ground);
    assert_eq!(doc.undo_stack_len(), 0);
}
