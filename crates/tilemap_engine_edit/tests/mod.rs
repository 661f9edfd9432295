use std::sync::Arc;

use parking_lot::Mutex;
use tilemap_engine_edit::{DocumentEvent, Layer, LayerId, LayerType, Map, MapDocument, MapObject, ObjectId, Orientation};


pub type EventLog = Arc<Mutex<Vec<DocumentEvent>>>;

pub fn create_test_map() -> Map {
    Map::new(Orientation::Orthogonal, (10, 8), (32, 32))
}

/// Document over a map with the given top level layers, bottom first.
pub fn create_test_document(layers: &[(LayerType, &str)]) -> (MapDocument, Vec<LayerId>) {
    let mut map = create_test_map();
    let mut ids = Vec::new();
    for (index, (layer_type, name)) in layers.iter().enumerate() {
        let layer = map.create_layer(*layer_type, *name);
        ids.push(layer.id());
        map.insert_layer(None, index, layer).unwrap();
    }
    (MapDocument::new(map), ids)
}

/// Object group "Objects" holding objects named `names`.
pub fn create_object_document(names: &[&str]) -> (MapDocument, LayerId, Vec<ObjectId>) {
    let mut map = create_test_map();
    let mut layer = map.create_layer(LayerType::ObjectGroup, "Objects");
    let mut ids = Vec::new();
    for name in names {
        let object = map.create_object(*name, "");
        ids.push(object.id());
        add_to_group(&mut layer, object);
    }
    let group = layer.id();
    map.insert_layer(None, 0, layer).unwrap();
    (MapDocument::new(map), group, ids)
}

pub fn add_to_group(layer: &mut Layer, object: MapObject) {
    layer.as_object_group_mut().unwrap().add_object(object);
}

pub fn record_events(doc: &mut MapDocument) -> EventLog {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    doc.subscribe(move |event: &DocumentEvent| sink.lock().push(event.clone()));
    log
}

pub fn object_names(doc: &MapDocument, group: LayerId) -> Vec<String> {
    doc.map().object_group(group).unwrap().objects().iter().map(|o| o.name.clone()).collect()
}

pub fn layer_names(doc: &MapDocument) -> Vec<String> {
    doc.map().top_level_layers().iter().map(|l| l.name().to_string()).collect()
}
