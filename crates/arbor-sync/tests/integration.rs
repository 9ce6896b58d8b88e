//! Integration tests for the full export/import cycle against the
//! in-process reference store.

use std::sync::Arc;

use uuid::Uuid;

use arbor_core::config::SyncConfig;
use arbor_core::types::{props, relations, Direction, PropertyMap, PropertyValue, RecordFlags};
use arbor_object::TypeRegistry;
use arbor_store::{GraphStore, MemoryStore, RecordStream, ScanFilter};
use arbor_sync::{MaintenanceRequest, SyncEngine, SyncError};

fn engine(store: &MemoryStore) -> SyncEngine {
    SyncEngine::new(
        Arc::new(store.clone()),
        Arc::new(TypeRegistry::new()),
        SyncConfig::default(),
    )
}

fn props_one(key: &str, value: PropertyValue) -> PropertyMap {
    let mut map = PropertyMap::new();
    map.insert(key.to_string(), value);
    map
}

/// Seed: an exported folder containing a file, a two-document
/// reference cycle, and a root document.
async fn seed_source(store: &MemoryStore) -> (Uuid, Uuid, Uuid) {
    let folder = store
        .put_node(
            "Folder",
            props_one(props::INCLUDE_IN_EXPORT, PropertyValue::Bool(true)),
            RecordFlags::default(),
        )
        .await
        .unwrap();
    let content_id = Uuid::new_v4();
    let file = store
        .put_node(
            "File",
            props_one(props::CONTENT_ID, content_id.to_string().into()),
            RecordFlags::default(),
        )
        .await
        .unwrap();
    store
        .put_edge(relations::CONTAINS, folder.key, file.key)
        .await
        .unwrap();

    let doc_a = store
        .put_node("Document", PropertyMap::new(), RecordFlags::default())
        .await
        .unwrap();
    let doc_b = store
        .put_node("Document", PropertyMap::new(), RecordFlags::default())
        .await
        .unwrap();
    store
        .put_edge(relations::REFERS_TO, doc_a.key, doc_b.key)
        .await
        .unwrap();
    store
        .put_edge(relations::REFERS_TO, doc_b.key, doc_a.key)
        .await
        .unwrap();

    store
        .put_node(
            "RootDocument",
            props_one(
                props::ELEMENTS,
                PropertyValue::List(vec![doc_a.uuid.to_string()]),
            ),
            RecordFlags::default(),
        )
        .await
        .unwrap();

    (folder.uuid, file.uuid, content_id)
}

async fn count_by_type(store: &MemoryStore, type_name: &str) -> usize {
    let mut stream = store.scan(ScanFilter::by_type(type_name)).await.unwrap();
    let mut count = 0;
    while stream.next().await.unwrap().is_some() {
        count += 1;
    }
    count
}

#[tokio::test]
async fn export_import_roundtrip_restores_the_graph() {
    let source = MemoryStore::new();
    let (folder_uuid, file_uuid, content_id) = seed_source(&source).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundle.json");

    let report = engine(&source).export(&path).await.unwrap();
    assert_eq!(report.nodes, 5);
    assert_eq!(report.relationships, 3);
    assert_eq!(report.files, 1);

    let target = MemoryStore::new();
    let report = engine(&target).import(&path).await.unwrap();
    assert_eq!(report.nodes, 5);
    assert_eq!(report.relationships, 3);
    assert_eq!(report.files, 1);

    // Uuids survive the key remap.
    let folder = target.get_by_uuid(folder_uuid).await.unwrap();
    let file = target.get_by_uuid(file_uuid).await.unwrap();
    assert_eq!(
        file.property(props::CONTENT_ID).and_then(PropertyValue::as_str),
        Some(content_id.to_string().as_str())
    );

    // The containment edge was remapped onto the restored keys.
    let edges = target
        .incident_edges(folder.key, relations::CONTAINS, Direction::Outgoing)
        .await
        .unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].target, file.key);

    assert_eq!(count_by_type(&target, "Document").await, 2);
    assert_eq!(count_by_type(&target, "RootDocument").await, 1);
}

#[tokio::test]
async fn import_into_populated_store_merges_the_singleton() {
    let source = MemoryStore::new();
    source
        .put_node(
            "RootDocument",
            props_one(
                props::ELEMENTS,
                PropertyValue::List(vec!["imported-child".to_string()]),
            ),
            RecordFlags::default(),
        )
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundle.json");
    engine(&source).export(&path).await.unwrap();

    // The target already has an older singleton instance.
    let target = MemoryStore::new();
    let existing = target
        .put_node(
            "RootDocument",
            props_one(
                props::ELEMENTS,
                PropertyValue::List(vec!["a".to_string(), "b".to_string()]),
            ),
            RecordFlags::default(),
        )
        .await
        .unwrap();

    engine(&target).import(&path).await.unwrap();

    // Exactly one instance remains: the imported (newest) one, with
    // the older children in front of its own.
    assert_eq!(count_by_type(&target, "RootDocument").await, 1);
    assert!(target.get(existing.key).await.is_err());

    let mut stream = target
        .scan(ScanFilter::by_type("RootDocument"))
        .await
        .unwrap();
    let survivor = stream.next().await.unwrap().unwrap();
    let elements = survivor
        .property(props::ELEMENTS)
        .and_then(PropertyValue::as_list)
        .unwrap();
    assert_eq!(elements, ["a", "b", "imported-child"]);
}

#[tokio::test]
async fn maintenance_surface_drives_the_cycle() {
    let source = MemoryStore::new();
    seed_source(&source).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundle.json");
    let path_str = path.to_str().unwrap();

    let export_params: serde_json::Map<String, serde_json::Value> =
        [("mode", "export"), ("file", path_str)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.into()))
            .collect();
    let request = MaintenanceRequest::from_params(&export_params).unwrap();
    let report = request.execute(&engine(&source)).await.unwrap();
    assert_eq!(report.nodes, 5);

    let target = MemoryStore::new();
    let import_params: serde_json::Map<String, serde_json::Value> =
        [("mode", "import"), ("file", path_str)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.into()))
            .collect();
    let request = MaintenanceRequest::from_params(&import_params).unwrap();
    request.execute(&engine(&target)).await.unwrap();
    assert_eq!(target.node_count(), 5);

    // A request without the file parameter is rejected before any
    // graph access.
    let bad: serde_json::Map<String, serde_json::Value> =
        [("mode".to_string(), serde_json::Value::from("export"))]
            .into_iter()
            .collect();
    assert!(matches!(
        MaintenanceRequest::from_params(&bad),
        Err(SyncError::BadRequest(_))
    ));
}

#[tokio::test]
async fn tampered_bundle_never_reaches_the_store() {
    let source = MemoryStore::new();
    seed_source(&source).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundle.json");
    engine(&source).export(&path).await.unwrap();

    // Flip a type name inside the file without re-stamping the hash.
    let text = std::fs::read_to_string(&path).unwrap();
    let tampered = text.replacen("\"File\"", "\"Image\"", 1);
    assert_ne!(text, tampered);
    std::fs::write(&path, tampered).unwrap();

    let target = MemoryStore::new();
    let result = engine(&target).import(&path).await;
    assert!(matches!(result, Err(SyncError::IntegrityViolation)));
    assert_eq!(target.node_count(), 0);
}
