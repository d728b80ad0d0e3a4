use super::*;

fn dataset(value: serde_json::Value) -> ViewgridResult<Dataset> {
    let Value::Object(map) = value else {
        panic!("fixture must be an object");
    };
    Dataset::from_parameters(map, "/data/set")
}

#[test]
fn bounds_from_ranges() {
    let d = dataset(serde_json::json!({
        "x_index_range": [0, 4],
        "y_index_range": [10, 14, 2],
    }))
    .unwrap();
    assert!(d.is_2d());
    assert_eq!(d.x_count(), 5);
    assert_eq!(d.y_count(), 3);
    assert_eq!(d.y_indices(), vec![10, 12, 14]);
    assert!(d.y_valid(12));
    assert!(!d.y_valid(11));
    assert_eq!(d.mid_index(), ViewIndex::new_2d(2, 12));
    assert_eq!(d.indices().len(), 15);
    assert_eq!(d.indices()[0], ViewIndex::new_2d(0, 10));
    assert_eq!(d.indices()[5], ViewIndex::new_2d(0, 12));
}

#[test]
fn bounds_from_counts_and_1d() {
    let d = dataset(serde_json::json!({ "x_count": 3 })).unwrap();
    assert!(d.is_1d());
    assert_eq!(d.x_indices(), vec![0, 1, 2]);
    assert_eq!(d.y_count(), 1);
    assert!(d.y_indices().is_empty());
    assert_eq!(
        d.indices(),
        vec![
            ViewIndex::new_1d(0),
            ViewIndex::new_1d(1),
            ViewIndex::new_1d(2)
        ]
    );
    assert!(matches!(
        d.row(0),
        Err(ViewgridError::StructuralMismatch(_))
    ));
}

#[test]
fn invalid_documents_are_rejected() {
    assert!(matches!(
        dataset(serde_json::json!({})),
        Err(ViewgridError::Parameters(_))
    ));
    assert!(dataset(serde_json::json!({ "x_index_range": [0] })).is_err());
    assert!(dataset(serde_json::json!({ "x_index_range": [0, "a"] })).is_err());
    assert!(dataset(serde_json::json!({ "x_index_range": [3, 1] })).is_err());
    assert!(dataset(serde_json::json!({ "x_count": 0 })).is_err());
    assert!(
        dataset(serde_json::json!({ "x_count": 2, "views": { "a,b": {} } }))
            .is_err()
    );
    assert!(
        dataset(serde_json::json!({ "x_count": 2, "views": { "1": 3 } }))
            .is_err()
    );
}

#[test]
fn y_only_documents_name_the_missing_x_bounds() {
    let err = dataset(serde_json::json!({
        "y_index_range": [0, 10],
        "image_filename_format": "img_{y}_{frame}.png"
    }))
    .unwrap_err();
    assert!(
        matches!(err, ViewgridError::Parameters(ref m) if m.contains("x_index_range")),
        "{err}"
    );
}

#[test]
fn view_checks_dimensionality_and_range() {
    let d = dataset(serde_json::json!({
        "x_index_range": [0, 4],
        "y_index_range": [0, 2],
    }))
    .unwrap();
    assert!(d.view(ViewIndex::new_2d(4, 2)).is_ok());
    assert!(matches!(
        d.view(ViewIndex::new_1d(1)),
        Err(ViewgridError::StructuralMismatch(_))
    ));
    assert!(matches!(
        d.view(ViewIndex::new_2d(5, 0)),
        Err(ViewgridError::OutOfRange(_))
    ));
    assert!(matches!(
        d.view(ViewIndex::new_2d(0, 3)),
        Err(ViewgridError::OutOfRange(_))
    ));
    assert_eq!(d.row(1).unwrap().len(), 5);
    assert!(matches!(d.row(3), Err(ViewgridError::OutOfRange(_))));
}

#[test]
fn paths_resolve_against_root() {
    let d = dataset(serde_json::json!({
        "x_count": 2,
        "cameras_filename": "cams.json",
        "width": 640,
        "height": 480,
    }))
    .unwrap();
    assert_eq!(
        d.cameras_filename().unwrap(),
        PathBuf::from("/data/set/cams.json")
    );
    assert_eq!(d.image_size().unwrap(), (640, 480));
}

#[test]
fn open_reads_file_and_sets_root() {
    let dir = std::env::temp_dir().join(format!(
        "viewgrid_model_open_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("parameters.json");
    std::fs::write(&path, r#"{ "x_index_range": [1, 3] }"#).unwrap();

    let d = Dataset::open(&path).unwrap();
    assert_eq!(d.root(), dir.as_path());
    assert_eq!(d.x_indices(), vec![1, 2, 3]);

    std::fs::write(&path, "[1, 2]").unwrap();
    assert!(matches!(
        Dataset::open(&path),
        Err(ViewgridError::Parameters(_))
    ));
    std::fs::write(&path, "{ nope").unwrap();
    assert!(matches!(Dataset::open(&path), Err(ViewgridError::Serde(_))));
    assert!(Dataset::open(dir.join("missing.json")).is_err());

    let _ = std::fs::remove_dir_all(&dir);
}
