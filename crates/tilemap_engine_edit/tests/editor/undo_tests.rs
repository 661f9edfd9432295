//! Tests for the undo history: round trips, macros, limits and clean state

use pretty_assertions::assert_eq;
use tilemap_engine_edit::{
    EditorError, EditorOptions, ItemData, ItemDataRole, Layer, LayerType, MapDocument, PointF, Region, SelectionSnapshot, UndoState,
};

use crate::{create_object_document, create_test_map};

#[derive(Debug, PartialEq)]
struct DocumentState {
    layers: Vec<Layer>,
    selection: SelectionSnapshot,
    selected_area: Region,
    layer_rows: usize,
    object_group_rows: usize,
}

fn capture(doc: &MapDocument) -> DocumentState {
    DocumentState {
        layers: doc.map().top_level_layers().to_vec(),
        selection: doc.selection_snapshot(),
        selected_area: doc.selected_area().clone(),
        layer_rows: doc.layer_model().row_count(None),
        object_group_rows: doc.object_model().row_count(None),
    }
}

/// Runs `edit`, which has to push exactly one entry, undoes it and checks
/// the document is back where it started. Redo has to reproduce the edit,
/// the document is left in the undone state.
fn assert_round_trip(doc: &mut MapDocument, edit: impl FnOnce(&mut MapDocument)) {
    let before = capture(doc);
    let undo_len = doc.undo_stack_len();

    edit(doc);
    assert_eq!(doc.undo_stack_len(), undo_len + 1);
    let after = capture(doc);

    doc.undo().unwrap();
    assert_eq!(capture(doc), before);

    doc.redo().unwrap();
    assert_eq!(capture(doc).layers, after.layers);
    doc.undo().unwrap();
}

/// Tile layer "Ground" below an object group holding a, b and c.
fn create_mixed_document() -> MapDocument {
    let (mut doc, group, objects) = create_object_document(&["a", "b", "c"]);
    let ground = doc.create_layer(LayerType::TileLayer, "Ground");
    doc.layer_model_mut().insert_layer(None, 0, ground).unwrap();
    doc.set_current_layer(Some(group)).unwrap();
    doc.set_selected_objects(vec![objects[1]]).unwrap();
    doc
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_layer_edits_round_trip() {
    let mut doc = create_mixed_document();
    let ground = doc.map().top_level_layers()[0].id();
    let group = doc.map().top_level_layers()[1].id();

    assert_round_trip(&mut doc, |doc| {
        doc.add_layer(LayerType::ObjectGroup).unwrap();
    });
    assert_round_trip(&mut doc, |doc| {
        doc.duplicate_layer().unwrap();
    });
    assert_round_trip(&mut doc, |doc| doc.remove_layer(group).unwrap());
    assert_round_trip(&mut doc, |doc| doc.remove_layer(ground).unwrap());
    assert_round_trip(&mut doc, |doc| doc.move_layer_down(group).unwrap());
    assert_round_trip(&mut doc, |doc| doc.toggle_other_layers(group).unwrap());
    assert_round_trip(&mut doc, |doc| doc.set_layer_offset(ground, (8.0, 8.0).into()).unwrap());
    assert_round_trip(&mut doc, |doc| {
        let index = doc.layer_model().index_of(ground).unwrap();
        doc.layer_model_mut().set_data(&index, ItemDataRole::Opacity, &ItemData::Number(0.5)).unwrap();
    });
}

#[test]
fn test_merge_round_trip() {
    let (mut doc, _) = crate::create_test_document(&[(LayerType::ObjectGroup, "Lower"), (LayerType::ObjectGroup, "Upper")]);
    let upper = doc.map().top_level_layers()[1].id();
    let object = doc.create_object("a", "");
    doc.add_object(upper, object).unwrap();
    doc.set_current_layer(Some(upper)).unwrap();

    assert_round_trip(&mut doc, |doc| {
        assert!(doc.merge_layer_down().unwrap());
    });
}

#[test]
fn test_object_edits_round_trip() {
    let mut doc = create_mixed_document();
    let group = doc.map().top_level_layers()[1].id();
    let objects: Vec<_> = doc.map().object_group(group).unwrap().objects().iter().map(|o| o.id()).collect();

    assert_round_trip(&mut doc, |doc| {
        let object = doc.create_object("d", "");
        doc.add_object(group, object).unwrap();
    });
    assert_round_trip(&mut doc, |doc| {
        doc.duplicate_objects(&objects[..2]).unwrap();
    });
    assert_round_trip(&mut doc, |doc| doc.remove_objects(&objects[1..]).unwrap());
    assert_round_trip(&mut doc, |doc| doc.move_objects_up(&[objects[0]]).unwrap());
    assert_round_trip(&mut doc, |doc| doc.move_objects_down(&[objects[2]]).unwrap());
    assert_round_trip(&mut doc, |doc| doc.change_object(objects[0], "door", "trigger").unwrap());
    assert_round_trip(&mut doc, |doc| {
        doc.rotate_selected_objects(tilemap_engine_edit::RotateDirection::Left).unwrap();
    });
}

#[test]
fn test_selected_area_round_trip() {
    let mut doc = create_mixed_document();
    let area = Region::from_rect((1, 1), (3, 2));
    assert_round_trip(&mut doc, |doc| doc.change_selected_area(area.clone()).unwrap());
    assert_eq!(doc.redo_description(), Some("Change Selection".to_string()));

    doc.change_selected_area(area.clone()).unwrap();
    assert_eq!(doc.selected_area(), &area);
    assert!(!doc.get_undo_stack().lock().undo_operations()[0].changes_data());
}

// ============================================================================
// History
// ============================================================================

#[test]
fn test_push_after_undo_discards_redo() {
    let (mut doc, layers) = crate::create_test_document(&[(LayerType::TileLayer, "A")]);
    doc.set_layer_offset(layers[0], (1.0, 0.0).into()).unwrap();
    doc.set_layer_offset(layers[0], (2.0, 0.0).into()).unwrap();
    doc.undo().unwrap();
    assert_eq!(doc.redo_stack_len(), 1);
    assert!(doc.can_redo());

    doc.set_layer_offset(layers[0], (5.0, 0.0).into()).unwrap();

    assert_eq!(doc.redo_stack_len(), 0);
    assert_eq!(doc.undo_stack_len(), 2);
}

#[test]
fn test_undo_on_empty_history_is_noop() {
    let mut doc = MapDocument::new(create_test_map());
    assert!(!doc.can_undo());
    doc.undo().unwrap();
    doc.redo().unwrap();
    assert_eq!(doc.undo_description(), None);
}

#[test]
fn test_undo_limit_from_options() {
    let options = EditorOptions {
        undo_limit: 2,
        ..Default::default()
    };
    let mut doc = MapDocument::with_options(create_test_map(), options);
    for _ in 0..3 {
        doc.add_layer(LayerType::TileLayer).unwrap();
    }
    assert_eq!(doc.undo_stack_len(), 2);
}

#[test]
fn test_clean_state() {
    let (mut doc, layers) = crate::create_test_document(&[(LayerType::TileLayer, "A")]);
    assert!(!doc.is_modified());

    doc.set_layer_offset(layers[0], (1.0, 0.0).into()).unwrap();
    assert!(doc.is_modified());
    doc.mark_clean();
    assert!(!doc.is_modified());

    doc.undo().unwrap();
    assert!(doc.is_modified());
    doc.redo().unwrap();
    assert!(!doc.is_modified());
}

// ============================================================================
// Macros
// ============================================================================

#[test]
fn test_second_macro_is_refused() {
    let mut doc = MapDocument::new(create_test_map());
    let _guard = doc.begin_atomic_undo("First").unwrap();

    let err = doc.begin_atomic_undo("Second").err().unwrap();

    assert_eq!(err.downcast_ref::<EditorError>(), Some(&EditorError::MacroAlreadyOpen));
}

#[test]
fn test_undo_while_macro_open_is_refused() {
    let (mut doc, layers) = crate::create_test_document(&[(LayerType::TileLayer, "A")]);
    doc.set_layer_offset(layers[0], (1.0, 0.0).into()).unwrap();
    let _guard = doc.begin_atomic_undo("Open").unwrap();

    let err = doc.undo().unwrap_err();

    assert_eq!(err.downcast_ref::<EditorError>(), Some(&EditorError::MacroInProgress));
    assert_eq!(doc.undo_stack_len(), 1);
}

#[test]
fn test_empty_macro_leaves_no_entry() {
    let mut doc = MapDocument::new(create_test_map());
    {
        let _guard = doc.begin_atomic_undo("Nothing").unwrap();
    }
    assert_eq!(doc.undo_stack_len(), 0);
    assert!(!doc.get_undo_stack().lock().is_macro_open());
}

#[test]
fn test_macro_is_one_entry() {
    let mut doc = MapDocument::new(create_test_map());
    {
        let _guard = doc.begin_atomic_undo("Add Two").unwrap();
        doc.add_layer(LayerType::TileLayer).unwrap();
        doc.add_layer(LayerType::ObjectGroup).unwrap();
    }
    assert_eq!(doc.undo_stack_len(), 1);
    assert_eq!(doc.undo_description(), Some("Add Two".to_string()));
    assert_eq!(doc.map().layer_count(), 2);

    doc.undo().unwrap();
    assert_eq!(doc.map().layer_count(), 0);
    assert_eq!(doc.redo_description(), Some("Add Two".to_string()));
}

#[test]
fn test_discard_and_undo() {
    let (mut doc, layers) = crate::create_test_document(&[(LayerType::TileLayer, "A")]);
    let mut guard = doc.begin_atomic_undo("Drag").unwrap();
    doc.set_layer_offset(layers[0], (4.0, 4.0).into()).unwrap();

    guard.discard_and_undo(&mut doc);
    drop(guard);

    assert_eq!(doc.map().layer(layers[0]).unwrap().offset(), PointF::ZERO);
    assert_eq!(doc.undo_stack_len(), 0);
    assert!(!doc.get_undo_stack().lock().is_macro_open());
}
