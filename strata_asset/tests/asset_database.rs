use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use strata_asset::{
    Asset, AssetDatabase, AssetError, AssetEvent, AssetType, H, MaterialAsset, Mesh, ModelAsset,
    ShaderAsset, ShaderSources, ShaderStage, TextureAsset, Vertex3D,
};

fn triangle() -> Mesh {
    Mesh::new(vec![
        Vertex3D::basic([0.0, 0.0, 0.0]),
        Vertex3D::basic([1.0, 0.0, 0.0]),
        Vertex3D::basic([0.0, 1.0, 0.0]),
    ])
}

fn record_events(db: &AssetDatabase) -> (Arc<Mutex<Vec<AssetEvent>>>, strata_utils::Subscription) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let subscription = db.subscribe(move |event| sink.lock().push(event.clone()));
    (events, subscription)
}

#[test]
fn import_and_retrieve() {
    let db = AssetDatabase::new();

    let material = db
        .import("materials/red.mat", MaterialAsset::builder().name("Red").build())
        .unwrap();
    let model = db
        .import("models/tri.model", ModelAsset::single(triangle(), material))
        .unwrap();

    assert_eq!(db.len(), 2);
    assert_eq!(db.material(material).unwrap().name, "Red");
    assert_eq!(db.model(model).unwrap().vertex_count(), 3);
    assert_eq!(db.id_of("models/tri.model"), Some(model.id()));
    assert_eq!(
        db.path_of(material.id()),
        Some(PathBuf::from("materials/red.mat"))
    );
    assert!(matches!(
        db.retrieve_path("materials/red.mat"),
        Some(Asset::Material(_))
    ));
}

#[test]
fn typed_access_checks_kind() {
    let db = AssetDatabase::new();
    let texture = db.import("tex/a.png", TextureAsset::new("tex/a.png")).unwrap();

    let wrong: H<MaterialAsset> = H::new(texture.id());
    assert!(db.get(wrong).is_none());
    assert!(db.handle::<MaterialAsset>(texture.id()).is_none());
    assert_eq!(db.handle::<TextureAsset>(texture.id()), Some(texture));
}

#[test]
fn duplicate_path_is_rejected() {
    let db = AssetDatabase::new();
    let first = db.import("tex/a.png", TextureAsset::new("tex/a.png")).unwrap();

    let err = db
        .import("tex/a.png", TextureAsset::new("tex/b.png"))
        .unwrap_err();
    assert!(matches!(err, AssetError::PathTaken { id, .. } if id == first.id()));
    assert_eq!(db.len(), 1);
}

#[test]
fn reimport_keeps_kind() {
    let db = AssetDatabase::new();
    let texture = db.import("tex/a.png", TextureAsset::new("tex/a.png")).unwrap();

    db.reimport(texture.id(), TextureAsset::linear("tex/a.png"))
        .unwrap();
    assert!(!db.texture(texture).unwrap().srgb);

    let err = db
        .reimport(texture.id(), MaterialAsset::builder().name("Nope").build())
        .unwrap_err();
    assert!(matches!(
        err,
        AssetError::KindMismatch {
            expected: AssetType::Texture,
            found: AssetType::Material,
            ..
        }
    ));
}

#[test]
fn remove_frees_the_path() {
    let db = AssetDatabase::new();
    let texture = db.import("tex/a.png", TextureAsset::new("tex/a.png")).unwrap();

    let removed = db.remove(texture.id()).unwrap();
    assert_eq!(removed.kind(), AssetType::Texture);
    assert!(db.texture(texture).is_none());
    assert!(db.id_of("tex/a.png").is_none());
    assert!(matches!(
        db.remove(texture.id()),
        Err(AssetError::UnknownAsset { .. })
    ));

    db.import("tex/a.png", TextureAsset::new("tex/a.png")).unwrap();
}

#[test]
fn rename_moves_path_index() {
    let db = AssetDatabase::new();
    let a = db.import("tex/a.png", TextureAsset::new("tex/a.png")).unwrap();
    db.import("tex/b.png", TextureAsset::new("tex/b.png")).unwrap();

    assert!(matches!(
        db.rename(a.id(), "tex/b.png"),
        Err(AssetError::PathTaken { .. })
    ));

    db.rename(a.id(), "tex/c.png").unwrap();
    assert!(db.id_of("tex/a.png").is_none());
    assert_eq!(db.id_of("tex/c.png"), Some(a.id()));
}

#[test]
fn events_are_published_in_order() {
    let db = AssetDatabase::new();
    let (events, subscription) = record_events(&db);

    let shader = db
        .import(
            "shaders/flat.wgsl",
            ShaderAsset::new(
                "Flat",
                ShaderSources::new().with_stage(ShaderStage::Vertex, "fn vs() {}"),
            ),
        )
        .unwrap();
    db.reimport(
        shader.id(),
        ShaderAsset::new(
            "Flat",
            ShaderSources::new().with_stage(ShaderStage::Fragment, "fn fs() {}"),
        ),
    )
    .unwrap();
    db.rename(shader.id(), "shaders/flat2.wgsl").unwrap();
    db.reimport_all();
    db.remove(shader.id()).unwrap();

    let id = shader.id();
    let kind = AssetType::Shader;
    assert_eq!(
        *events.lock(),
        vec![
            AssetEvent::Import { id, kind },
            AssetEvent::Reimport { id, kind },
            AssetEvent::Rename {
                id,
                kind,
                from: "shaders/flat.wgsl".into(),
                to: "shaders/flat2.wgsl".into(),
            },
            AssetEvent::ReimportAll,
            AssetEvent::Remove { id, kind },
        ]
    );

    drop(subscription);
    db.reimport_all();
    assert_eq!(events.lock().len(), 5);
}

#[test]
fn subscriber_may_query_database() {
    let db = AssetDatabase::new();
    let seen = Arc::new(Mutex::new(None));

    let weak = Arc::downgrade(&db);
    let sink = seen.clone();
    let _subscription = db.subscribe(move |event| {
        if let (Some(db), Some(id)) = (weak.upgrade(), event.id()) {
            *sink.lock() = db.path_of(id);
        }
    });

    db.import("tex/a.png", TextureAsset::new("tex/a.png")).unwrap();
    assert_eq!(*seen.lock(), Some(PathBuf::from("tex/a.png")));
}

#[test]
fn iter_kind_filters() {
    let db = AssetDatabase::new();
    db.import("tex/a.png", TextureAsset::new("tex/a.png")).unwrap();
    db.import("tex/b.png", TextureAsset::new("tex/b.png")).unwrap();
    db.import("mat/a.mat", MaterialAsset::builder().name("A").build())
        .unwrap();

    assert_eq!(db.iter_kind::<TextureAsset>().len(), 2);
    assert_eq!(db.iter_kind::<MaterialAsset>().len(), 1);
    assert!(db.iter_kind::<ModelAsset>().is_empty());
}
